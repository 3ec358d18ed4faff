//! Job details extraction: company, hiring manager and address pulled from a raw job
//! description with case-insensitive regex heuristics. The first matching pattern in
//! each group wins; a group with no match stays empty.

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct JobDetails {
    #[serde(default, alias = "company_name")]
    pub company_name: String,
    #[serde(default, alias = "hiring_manager")]
    pub hiring_manager: String,
    #[serde(default)]
    pub address: String,
}

fn compile(patterns: &[&str]) -> Vec<Regex> {
    patterns
        .iter()
        .map(|p| Regex::new(p).expect("valid job details regex"))
        .collect()
}

static COMPANY_PATTERNS: Lazy<Vec<Regex>> = Lazy::new(|| {
    compile(&[
        r"(?i)(?:Company|Employer|Organization):\s*([^\n]+)",
        r"(?i)^([A-Z][A-Za-z\s&.,'-]+)\s+(?:is hiring|is looking|seeks|needs)",
        r"(?i)(?:at|for)\s+([A-Z][A-Za-z\s&.,'-]+)\s+(?:in|located)",
    ])
});

static MANAGER_PATTERNS: Lazy<Vec<Regex>> = Lazy::new(|| {
    compile(&[
        r"(?i)(?:Hiring Manager|Contact|Recruiter|Hiring|Manager):\s*([A-Z][a-z]+(?:\s+[A-Z][a-z]+)*)",
        r"(?i)(?:Please contact|Reach out to|Contact)\s+([A-Z][a-z]+(?:\s+[A-Z][a-z]+)*)",
    ])
});

static ADDRESS_PATTERNS: Lazy<Vec<Regex>> = Lazy::new(|| {
    compile(&[
        r"(?i)(?:Address|Location|Based in|Office):\s*([^\n]+)",
        r"(?i)(?:in|located in|based in)\s+([A-Z][A-Za-z\s,]+(?:,\s*[A-Z]{2})?(?:\s+\d{5})?)",
    ])
});

fn first_capture(patterns: &[Regex], text: &str) -> String {
    patterns
        .iter()
        .find_map(|re| re.captures(text))
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str().trim().to_string())
        .unwrap_or_default()
}

pub fn extract_job_details(job_description: &str) -> JobDetails {
    JobDetails {
        company_name: first_capture(&COMPANY_PATTERNS, job_description),
        hiring_manager: first_capture(&MANAGER_PATTERNS, job_description),
        address: first_capture(&ADDRESS_PATTERNS, job_description),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_labelled_fields() {
        let jd = "Company: Acme Corp\nLocation: Berlin, Germany\nWe build robots.\nHiring Manager: Jane Smith";
        let details = extract_job_details(jd);
        assert_eq!(details.company_name, "Acme Corp");
        assert_eq!(details.address, "Berlin, Germany");
        assert_eq!(details.hiring_manager, "Jane Smith");
    }

    #[test]
    fn test_company_from_opening_sentence() {
        let jd = "Acme Robotics is hiring a Senior Rust Engineer to join the platform team.";
        assert_eq!(extract_job_details(jd).company_name, "Acme Robotics");
    }

    #[test]
    fn test_contact_phrase() {
        let jd = "Questions about the role? Please contact Maria Lopez.";
        assert_eq!(extract_job_details(jd).hiring_manager, "Maria Lopez");
    }

    #[test]
    fn test_nothing_found_is_empty() {
        assert_eq!(extract_job_details("12345 67890"), JobDetails::default());
    }

    #[test]
    fn test_camel_case_on_the_wire_snake_case_accepted() {
        let json = r#"{"companyName":"Acme","hiringManager":"Jo","address":"Paris"}"#;
        let details: JobDetails = serde_json::from_str(json).unwrap();
        assert_eq!(details.company_name, "Acme");
        assert_eq!(details.hiring_manager, "Jo");

        let snake: JobDetails =
            serde_json::from_str(r#"{"company_name":"Acme","hiring_manager":"Jo"}"#).unwrap();
        assert_eq!(snake.hiring_manager, "Jo");

        let out = serde_json::to_value(&details).unwrap();
        assert_eq!(out["companyName"], "Acme");
        assert_eq!(out["hiringManager"], "Jo");
        assert!(out.get("company_name").is_none());
    }
}
