use std::fmt::Display;

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// Value emitted for any text field whose selector did not match.
pub const NOT_FOUND: &str = "not-found";

/// Employee count as shown on the face-pile link.
///
/// The link usually reads "View all 1,234 employees" and yields a number, but
/// some pages carry free text with no digits at all, which is kept verbatim.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(untagged)]
pub enum EmployeeCount {
    Count(u64),
    Text(String),
}

impl Default for EmployeeCount {
    fn default() -> Self {
        EmployeeCount::Text(NOT_FOUND.to_string())
    }
}

impl Display for EmployeeCount {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            EmployeeCount::Count(n) => write!(f, "{}", n),
            EmployeeCount::Text(s) => write!(f, "{}", s),
        }
    }
}

/// One scraped company profile page.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct CompanyRecord {
    pub company_name: String,
    pub linkedin_followers_count: u64,
    pub company_logo_url: String,
    pub about_us: String,
    pub num_of_employees: EmployeeCount,
    pub website: String,
    pub industry: String,
    pub company_size_approx: String,
    pub headquarters: String,
    #[serde(rename = "type")]
    pub company_type: String,
    pub founded: String,
    pub specialties: String,
    pub funding: String,
    pub funding_total_rounds: u32,
    pub funding_option: String,
    pub last_funding_round: String,
}

impl Default for CompanyRecord {
    fn default() -> Self {
        Self {
            company_name: NOT_FOUND.to_string(),
            linkedin_followers_count: 0,
            company_logo_url: NOT_FOUND.to_string(),
            about_us: NOT_FOUND.to_string(),
            num_of_employees: EmployeeCount::default(),
            website: NOT_FOUND.to_string(),
            industry: NOT_FOUND.to_string(),
            company_size_approx: NOT_FOUND.to_string(),
            headquarters: NOT_FOUND.to_string(),
            company_type: NOT_FOUND.to_string(),
            founded: NOT_FOUND.to_string(),
            specialties: NOT_FOUND.to_string(),
            funding: NOT_FOUND.to_string(),
            funding_total_rounds: 0,
            funding_option: NOT_FOUND.to_string(),
            last_funding_round: NOT_FOUND.to_string(),
        }
    }
}

impl CompanyRecord {
    pub fn has_name(&self) -> bool {
        self.company_name != NOT_FOUND && !self.company_name.is_empty()
    }
}

impl Display for CompanyRecord {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "┌─ {}", self.company_name)?;
        writeln!(f, "│  Followers:    {}", self.linkedin_followers_count)?;
        writeln!(f, "│  Employees:    {}", self.num_of_employees)?;
        writeln!(f, "│  Website:      {}", self.website)?;
        writeln!(f, "│  Industry:     {}", self.industry)?;
        writeln!(f, "│  Size:         {}", self.company_size_approx)?;
        writeln!(f, "│  Headquarters: {}", self.headquarters)?;
        writeln!(f, "│  Type:         {}", self.company_type)?;
        writeln!(f, "│  Founded:      {}", self.founded)?;
        writeln!(f, "│  Specialties:  {}", self.specialties)?;
        writeln!(
            f,
            "│  Funding:      {} ({} round(s), last: {} {})",
            self.funding, self.funding_total_rounds, self.funding_option, self.last_funding_round
        )?;
        if self.about_us != NOT_FOUND {
            let preview: String = self.about_us.chars().take(120).collect();
            let ellipsis = if self.about_us.chars().count() > 120 { "…" } else { "" };
            writeln!(f, "│  About: {}{}", preview, ellipsis)?;
        }
        write!(f, "└─ Logo: {}", self.company_logo_url)
    }
}
