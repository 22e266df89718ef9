use serde::{Deserialize, Serialize};

use crate::config::MetaConfig;

/// SEO title/description/keywords for a device listing page.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MetaTags {
    pub title: String,
    pub description: String,
    pub keywords: String,
}

pub fn generate_meta_tags(model: &str, year: i32, config: &MetaConfig) -> MetaTags {
    let country = &config.country;
    let code = &config.country_code;

    MetaTags {
        title: format!("{model} Price in {country} {year}, Full Specs"),
        description: format!(
            "{model} Full Specifications, Price, Showrooms and Reviews in {country} {year}. \
             Compare {model} best prices before buying online."
        ),
        keywords: format!(
            "{model}, {model} price in {country}, {model} {code} prices, \
             {model} full specifications, {model} news reviews"
        ),
    }
}
