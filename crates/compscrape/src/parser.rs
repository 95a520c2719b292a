use std::sync::LazyLock;

use regex::Regex;
use scraper::{ElementRef, Html, Selector};

use crate::types::{CompanyRecord, EmployeeCount, NOT_FOUND};

static RE_EMPLOYEES: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\d{1,3}(?:,\d{3})*").expect("invalid regex: employee count")
});

fn selector(css: &str) -> Selector {
    Selector::parse(css).unwrap_or_else(|e| panic!("invalid selector '{css}': {e:?}"))
}

static SEL_NAME: LazyLock<Selector> =
    LazyLock::new(|| selector(".top-card-layout__entity-info h1"));
static SEL_SUBLINE: LazyLock<Selector> =
    LazyLock::new(|| selector("h3.top-card-layout__first-subline"));
static SEL_LOGO: LazyLock<Selector> =
    LazyLock::new(|| selector("div.top-card-layout__entity-image-container img"));
static SEL_ABOUT: LazyLock<Selector> =
    LazyLock::new(|| selector(".core-section-container__content p"));
static SEL_EMPLOYEES: LazyLock<Selector> = LazyLock::new(|| selector("a.face-pile__cta"));
static SEL_DETAIL_ITEM: LazyLock<Selector> =
    LazyLock::new(|| selector(".core-section-container__content .mb-2"));
static SEL_TEXT_MD: LazyLock<Selector> = LazyLock::new(|| selector(".text-md"));
static SEL_LINK: LazyLock<Selector> = LazyLock::new(|| selector("a"));
static SEL_FUNDING: LazyLock<Selector> = LazyLock::new(|| selector("p.text-display-lg"));
static SEL_FUNDING_ROUNDS: LazyLock<Selector> = LazyLock::new(|| {
    selector(r#"section.aside-section-container > div > a.link-styled span[class~="before:middot"]"#)
});
static SEL_FUNDING_OPTION: LazyLock<Selector> = LazyLock::new(|| {
    selector("section.aside-section-container > div div.my-2 > a.link-styled")
});
static SEL_LAST_ROUND: LazyLock<Selector> = LazyLock::new(|| {
    selector(
        r#"section.aside-section-container > div div.my-2 > a.link-styled time[class~="before:middot"]"#,
    )
});

/// Non-blank text nodes that are direct children of `element`, trimmed.
fn own_texts<'a>(element: ElementRef<'a>) -> impl Iterator<Item = String> + 'a {
    element
        .children()
        .filter_map(|node| node.value().as_text())
        .map(|text| text.trim().to_string())
        .filter(|text| !text.is_empty())
}

fn first_text(root: ElementRef, selector: &Selector) -> Option<String> {
    root.select(selector).flat_map(own_texts).next()
}

fn first_text_or_default(root: ElementRef, selector: &Selector) -> String {
    first_text(root, selector).unwrap_or_else(|| NOT_FOUND.to_string())
}

fn elem_text(element: ElementRef) -> String {
    element.text().collect::<String>()
}

fn parse_followers(root: ElementRef) -> u64 {
    let Some(subline) = root.select(&SEL_SUBLINE).next() else {
        return 0;
    };
    let Some(span) = subline
        .children()
        .filter_map(ElementRef::wrap)
        .find(|child| child.value().name() == "span")
    else {
        return 0;
    };

    let text = span
        .next_siblings()
        .filter_map(|node| node.value().as_text())
        .map(|text| text.trim().to_string())
        .find(|text| !text.is_empty());

    text.as_deref()
        .and_then(|t| t.split_whitespace().next())
        .map(|token| token.replace(',', ""))
        .and_then(|token| token.parse::<f64>().ok())
        .filter(|n| n.is_finite() && *n >= 0.0)
        .map(|n| n as u64)
        .unwrap_or(0)
}

fn parse_employees(root: ElementRef) -> EmployeeCount {
    let Some(text) = root
        .select(&SEL_EMPLOYEES)
        .next()
        .map(|e| elem_text(e).trim().to_string())
    else {
        return EmployeeCount::default();
    };

    match RE_EMPLOYEES
        .find(&text)
        .and_then(|m| m.as_str().replace(',', "").parse::<u64>().ok())
    {
        Some(count) => EmployeeCount::Count(count),
        None if text.is_empty() => EmployeeCount::default(),
        None => EmployeeCount::Text(text),
    }
}

/// Scans the "about" detail list as label/value pairs.
///
/// An entry without both a label and a value ends the scan; whatever was
/// assigned before it is kept.
fn parse_details(root: ElementRef, record: &mut CompanyRecord) {
    for (i, item) in root.select(&SEL_DETAIL_ITEM).enumerate() {
        let mut texts = item.select(&SEL_TEXT_MD).flat_map(own_texts);
        let label = texts.next();
        let value = texts
            .next()
            .or_else(|| first_text(item, &SEL_LINK))
            .or_else(|| {
                item.select(&SEL_LINK)
                    .map(|a| elem_text(a).trim().to_string())
                    .find(|t| !t.is_empty())
            });

        let (Some(label), Some(value)) = (label, value) else {
            log::error!(
                "Detail entry {} is missing its label or value, skipping remaining details",
                i + 1
            );
            return;
        };

        match label.to_lowercase().as_str() {
            "website" => record.website = value,
            "industry" => record.industry = value,
            "company size" => {
                record.company_size_approx = value
                    .split_whitespace()
                    .next()
                    .unwrap_or(NOT_FOUND)
                    .to_string()
            }
            "headquarters" => record.headquarters = value,
            "type" => record.company_type = value,
            "founded" => record.founded = value,
            "specialties" => record.specialties = value,
            other => log::debug!("Ignoring detail entry '{}'", other),
        }
    }
}

fn parse_funding_rounds(root: ElementRef) -> u32 {
    first_text(root, &SEL_FUNDING_ROUNDS)
        .as_deref()
        .and_then(|t| t.split_whitespace().next())
        .and_then(|token| token.replace(',', "").parse::<u32>().ok())
        .unwrap_or(0)
}

/// Extracts a [`CompanyRecord`] from a company profile page.
///
/// Never fails: fields whose markup is missing or unparsable fall back to
/// [`NOT_FOUND`] or `0`.
pub fn parse_company_profile(html: &str) -> CompanyRecord {
    let document = Html::parse_document(html);
    let root = document.root_element();

    let mut record = CompanyRecord {
        company_name: first_text_or_default(root, &SEL_NAME),
        linkedin_followers_count: parse_followers(root),
        company_logo_url: root
            .select(&SEL_LOGO)
            .filter_map(|img| img.value().attr("data-delayed-url"))
            .map(|url| url.trim().to_string())
            .next()
            .unwrap_or_else(|| NOT_FOUND.to_string()),
        about_us: first_text_or_default(root, &SEL_ABOUT),
        num_of_employees: parse_employees(root),
        ..Default::default()
    };

    // A truncated detail scan does not affect the funding fields below.
    parse_details(root, &mut record);

    record.funding = first_text_or_default(root, &SEL_FUNDING);
    record.funding_total_rounds = parse_funding_rounds(root);
    record.funding_option = first_text_or_default(root, &SEL_FUNDING_OPTION);
    record.last_funding_round = first_text_or_default(root, &SEL_LAST_ROUND);

    record
}
