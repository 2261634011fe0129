//! Summary projection shown on the review step.

use serde::Serialize;

use super::model::{FormData, is_filled};

/// One row of the review screen.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SummaryRow {
    pub key: &'static str,
    pub label: &'static str,
    pub value: String,
}

/// Project the form into ordered rows, dropping empty fields.
///
/// Order: company, website, social, industry, audience, goal.
pub fn summarize(form: &FormData) -> Vec<SummaryRow> {
    let social = form
        .social_links
        .present()
        .into_iter()
        .map(|(network, url)| format!("{network}: {}", url.trim()))
        .collect::<Vec<_>>()
        .join(", ");

    let candidates = [
        ("company", "Company", form.company_name.trim().to_string()),
        ("website", "Website", form.website.trim().to_string()),
        ("social", "Social media", social),
        ("industry", "Industry", form.industry.trim().to_string()),
        ("audience", "Target audience", form.target_audience.trim().to_string()),
        ("goal", "Goal", form.goal.trim().to_string()),
    ];

    candidates
        .into_iter()
        .filter(|(_, _, value)| is_filled(value))
        .map(|(key, label, value)| SummaryRow { key, label, value })
        .collect()
}

/// Plain-text rendering used by the terminal wizard.
pub fn render_text(rows: &[SummaryRow]) -> String {
    if rows.is_empty() {
        return "(nothing entered yet)".to_string();
    }
    let width = rows.iter().map(|r| r.label.len()).max().unwrap_or(0);
    rows.iter()
        .map(|r| format!("{:<width$}  {}", r.label, r.value, width = width))
        .collect::<Vec<_>>()
        .join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::onboarding::model::FormField;

    #[test]
    fn acme_summary_has_company_website_goal_in_order() {
        let form = FormData::default()
            .with_field(FormField::CompanyName, "Acme Co")
            .with_field(FormField::Website, "https://acme.co")
            .with_field(FormField::Goal, "Increase Sales");

        let rows = summarize(&form);
        let keys: Vec<&str> = rows.iter().map(|r| r.key).collect();
        assert_eq!(keys, vec!["company", "website", "goal"]);
        assert_eq!(rows[0].value, "Acme Co");
        assert_eq!(rows[1].value, "https://acme.co");
        assert_eq!(rows[2].value, "Increase Sales");
    }

    #[test]
    fn full_form_uses_declared_order() {
        let form = FormData::default()
            .with_field(FormField::Goal, "Launch")
            .with_field(FormField::TargetAudience, "Developers")
            .with_field(FormField::Industry, "Software")
            .with_field(FormField::Twitter, "https://x.com/acme")
            .with_field(FormField::Website, "https://acme.co")
            .with_field(FormField::CompanyName, "Acme Co");

        let keys: Vec<&str> = summarize(&form).iter().map(|r| r.key).collect();
        assert_eq!(
            keys,
            vec!["company", "website", "social", "industry", "audience", "goal"]
        );
    }

    #[test]
    fn social_row_lists_each_present_network() {
        let form = FormData::default()
            .with_field(FormField::Linkedin, "https://linkedin.com/company/acme")
            .with_field(FormField::Instagram, "https://instagram.com/acme");

        let rows = summarize(&form);
        assert_eq!(rows.len(), 1);
        assert_eq!(
            rows[0].value,
            "LinkedIn: https://linkedin.com/company/acme, Instagram: https://instagram.com/acme"
        );
    }

    #[test]
    fn whitespace_fields_are_omitted() {
        let form = FormData::default()
            .with_field(FormField::CompanyName, "Acme Co")
            .with_field(FormField::Industry, "   ");
        let rows = summarize(&form);
        assert_eq!(rows.len(), 1);
    }

    #[test]
    fn render_text_aligns_labels() {
        let form = FormData::default()
            .with_field(FormField::CompanyName, "Acme Co")
            .with_field(FormField::Goal, "Grow");
        let text = render_text(&summarize(&form));
        assert_eq!(text, "Company  Acme Co\nGoal     Grow");
        assert_eq!(render_text(&[]), "(nothing entered yet)");
    }
}
