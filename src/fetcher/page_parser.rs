use anyhow::{Result, anyhow};
use scraper::{ElementRef, Html, Node, Selector};
use tracing::debug;

use crate::config::{SelectorConfig, SiteConfig};
use crate::models::{RawSpecRecord, SpecTable};

/// Turns catalog HTML into link lists and raw spec records.
pub struct PageParser {
    site: SiteConfig,
    latest_module: Selector,
    latest_link: Selector,
    device_name: Selector,
    device_image: Selector,
    highlights: Selector,
    spec_tables: Selector,
    row: Selector,
    header: Selector,
    label: Selector,
    value: Selector,
}

fn selector(css: &str) -> Result<Selector> {
    Selector::parse(css).map_err(|e| anyhow!("Invalid selector '{}': {:?}", css, e))
}

impl PageParser {
    pub fn new(site: &SiteConfig, selectors: &SelectorConfig) -> Result<Self> {
        Ok(Self {
            site: site.clone(),
            latest_module: selector(&selectors.latest_module)?,
            latest_link: selector(&selectors.latest_link)?,
            device_name: selector(&selectors.device_name)?,
            device_image: selector(&selectors.device_image)?,
            highlights: selector(&selectors.highlights)?,
            spec_tables: selector(&selectors.spec_tables)?,
            row: selector("tr")?,
            header: selector("th")?,
            label: selector("td.ttl")?,
            value: selector("td.nfo")?,
        })
    }

    /// Device links from the first "latest devices" module, in page order.
    pub fn parse_latest_links(&self, html: &str) -> Vec<String> {
        let document = Html::parse_document(html);

        let Some(module) = document.select(&self.latest_module).next() else {
            debug!("No latest-devices module on page");
            return Vec::new();
        };

        module
            .select(&self.latest_link)
            .filter_map(|link| link.value().attr("href"))
            .filter(|href| !href.trim().is_empty())
            .map(|href| self.site.absolute_url(href.trim()))
            .collect()
    }

    /// Read one device page. Fails only when the title element is missing.
    pub fn parse_device_page(&self, html: &str, url: &str) -> Result<RawSpecRecord> {
        let document = Html::parse_document(html);

        let name = document
            .select(&self.device_name)
            .next()
            .map(inner_text)
            .filter(|name| !name.is_empty())
            .ok_or_else(|| anyhow!("Device title element not found on {}", url))?;

        let image = document
            .select(&self.device_image)
            .next()
            .and_then(|img| img.value().attr("src"))
            .filter(|src| !src.trim().is_empty())
            .map(|src| self.site.absolute_url(src.trim()));

        let highlights = document
            .select(&self.highlights)
            .map(inner_text)
            .filter(|text| !text.is_empty())
            .collect();

        Ok(RawSpecRecord {
            url: url.to_string(),
            name,
            image,
            highlights,
            specs: self.parse_spec_tables(&document),
        })
    }

    fn parse_spec_tables(&self, document: &Html) -> SpecTable {
        let mut specs = SpecTable::new();

        for table in document.select(&self.spec_tables) {
            let mut category = String::new();

            for row in table.select(&self.row) {
                // The site stylesheet renders headers upper-case.
                if let Some(header) = row.select(&self.header).next() {
                    category = inner_text(header).to_uppercase();
                    if !category.is_empty() {
                        specs.category_mut(&category);
                    }
                }

                let label = row.select(&self.label).next();
                let value = row.select(&self.value).next();
                if let (Some(label), Some(value)) = (label, value) {
                    if !category.is_empty() {
                        specs.insert(&category, inner_text(label), inner_text(value));
                    }
                }
            }
        }

        specs
    }
}

/// Layout whitespace: everything `char::is_whitespace` accepts except the
/// non-breaking space, which the catalog uses as a real label.
fn is_layout_space(c: char) -> bool {
    c.is_whitespace() && c != '\u{a0}'
}

/// Rendered text of an element: whitespace runs collapse to one space,
/// `<br>` becomes a newline, and every line is trimmed.
pub fn inner_text(element: ElementRef) -> String {
    let mut out = String::new();

    for node in element.descendants() {
        match node.value() {
            Node::Text(text) => {
                for ch in text.chars() {
                    if is_layout_space(ch) {
                        if !out.ends_with(' ') {
                            out.push(' ');
                        }
                    } else {
                        out.push(ch);
                    }
                }
            }
            Node::Element(el) if el.name() == "br" => out.push('\n'),
            _ => {}
        }
    }

    out.split('\n')
        .map(|line| line.trim_matches(is_layout_space))
        .collect::<Vec<_>>()
        .join("\n")
        .trim_matches(is_layout_space)
        .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::CONTINUATION_LABEL;

    fn parser() -> PageParser {
        PageParser::new(&SiteConfig::default(), &SelectorConfig::default()).unwrap()
    }

    const HOME: &str = r#"
        <html><body>
          <div class="module-phones module-latest">
            <a class="module-phones-link" href="acme_x1-13001.php">Acme X1</a>
            <a class="module-phones-link" href="acme_x2-13002.php">Acme X2</a>
            <a class="module-phones-link">broken</a>
          </div>
          <div class="module-phones module-latest">
            <a class="module-phones-link" href="other-1.php">Other</a>
          </div>
        </body></html>
    "#;

    const DEVICE: &str = r#"
        <html><body>
          <h1 class="specs-phone-name-title">Acme X1 Pro</h1>
          <div class="specs-photo-main"><a href="#"><img src="https://fdn2.gsmarena.com/vv/bigpic/acme-x1-pro.jpg"></a></div>
          <ul class="specs-spotlight-features">
            <li>Released 2025, March 3</li>
            <li> 218g, 8.2mm thickness </li>
          </ul>
          <div id="specs-list">
            <table>
              <tr><th rowspan="3">Body</th><td class="ttl"><a href="#">Dimensions</a></td><td class="nfo">162.3 x 75.6 x 8.2 mm</td></tr>
              <tr><td class="ttl">Weight</td><td class="nfo">218 g</td></tr>
              <tr><td class="ttl">&nbsp;</td><td class="nfo">IP68 dust/water resistant</td></tr>
            </table>
            <table>
              <tr><th>Main Camera</th><td class="ttl">Triple</td><td class="nfo">50 MP, f/1.8, 24mm (wide)<br>
                  50 MP, f/2.8, 70mm (telephoto)<br>
                  12 MP, f/2.2 (ultrawide)</td></tr>
              <tr><td class="ttl">Video</td><td class="nfo">4K@30/60fps</td></tr>
            </table>
            <table>
              <tr><th>Body</th><td class="ttl">SIM</td><td class="nfo">Nano-SIM</td></tr>
            </table>
          </div>
        </body></html>
    "#;

    #[test]
    fn test_latest_links_first_module_only() {
        let links = parser().parse_latest_links(HOME);
        assert_eq!(
            links,
            vec![
                "https://www.gsmarena.com/acme_x1-13001.php",
                "https://www.gsmarena.com/acme_x2-13002.php",
            ]
        );
    }

    #[test]
    fn test_latest_links_missing_module() {
        assert!(parser().parse_latest_links("<html><body></body></html>").is_empty());
    }

    #[test]
    fn test_device_page() {
        let url = "https://www.gsmarena.com/acme_x1_pro-13003.php";
        let record = parser().parse_device_page(DEVICE, url).unwrap();

        assert_eq!(record.url, url);
        assert_eq!(record.name, "Acme X1 Pro");
        assert_eq!(
            record.image.as_deref(),
            Some("https://fdn2.gsmarena.com/vv/bigpic/acme-x1-pro.jpg")
        );
        assert_eq!(record.highlights, vec!["Released 2025, March 3", "218g, 8.2mm thickness"]);

        let specs = &record.specs;
        assert_eq!(specs.get("BODY", "Dimensions"), "162.3 x 75.6 x 8.2 mm");
        assert_eq!(specs.get("BODY", CONTINUATION_LABEL), "IP68 dust/water resistant");
        assert_eq!(specs.get("BODY", "  "), "IP68 dust/water resistant");
        assert_eq!(specs.get("BODY", "SIM"), "Nano-SIM");
        assert_eq!(
            specs.get("MAIN CAMERA", "Triple"),
            "50 MP, f/1.8, 24mm (wide)\n50 MP, f/2.8, 70mm (telephoto)\n12 MP, f/2.2 (ultrawide)"
        );
        assert_eq!(specs.len(), 2);
    }

    #[test]
    fn test_device_page_without_title_fails() {
        let result = parser().parse_device_page("<html><body><p>Not found</p></body></html>", "u");
        assert!(result.is_err());
    }

    #[test]
    fn test_device_page_without_specs() {
        let html = r#"<h1 class="specs-phone-name-title">Acme Mini</h1>"#;
        let record = parser().parse_device_page(html, "u").unwrap();
        assert!(record.specs.is_empty());
        assert!(record.image.is_none());
        assert!(record.highlights.is_empty());
    }
}
