//! Text synthesized from the wizard's answers for the assistant.

use super::model::{FormData, is_filled};

/// Default instructions for the plan assistant, used by the proxy until an
/// assistant configuration is registered.
pub const DEFAULT_ASSISTANT_INSTRUCTIONS: &str = "\
You are a business planning assistant for small agencies and their clients.

Guidelines:
- Be concise and practical. Prefer short numbered steps over long paragraphs.
- Ask ONE clarifying question at a time when something important is missing.
- Tie every recommendation back to the user's stated goal.
- When the user has not told you their company, industry, audience or goal, \
gather those conversationally before proposing a plan.";

/// Build the first message sent to the assistant once the wizard hands off
/// to chat.
///
/// Uses whatever has been collected. When nothing is known yet the message
/// asks the assistant to gather the basics itself.
pub fn opening_message(form: &FormData) -> String {
    let mut facts = Vec::new();

    if is_filled(&form.company_name) {
        facts.push(format!("My company is {}.", form.company_name.trim()));
    }
    if is_filled(&form.website) {
        facts.push(format!("Our website is {}.", form.website.trim()));
    }
    let social = form.social_links.present();
    if !social.is_empty() {
        let list = social
            .iter()
            .map(|(network, url)| format!("{network} ({})", url.trim()))
            .collect::<Vec<_>>()
            .join(", ");
        facts.push(format!("You can find us on {list}."));
    }
    if is_filled(&form.industry) {
        facts.push(format!("We work in {}.", form.industry.trim()));
    }
    if is_filled(&form.target_audience) {
        facts.push(format!(
            "Our target audience is {}.",
            form.target_audience.trim()
        ));
    }
    if is_filled(&form.goal) {
        facts.push(format!("Our main goal is: {}.", form.goal.trim().trim_end_matches('.')));
    }

    if facts.is_empty() {
        return "Hi! I'd like help building a plan for my business. I haven't shared any \
                details yet, so please start by asking me about my company and what I \
                want to achieve."
            .to_string();
    }

    format!(
        "Hi! I'd like help building a plan for my business. {} Please suggest the first \
         steps we should take, and ask me about anything important that's missing.",
        facts.join(" ")
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::onboarding::model::FormField;

    #[test]
    fn opening_message_includes_collected_fields() {
        let form = FormData::default()
            .with_field(FormField::CompanyName, "Acme Co")
            .with_field(FormField::Website, "https://acme.co")
            .with_field(FormField::Linkedin, "https://linkedin.com/company/acme")
            .with_field(FormField::Goal, "Increase Sales.");

        let msg = opening_message(&form);
        assert!(msg.contains("My company is Acme Co."));
        assert!(msg.contains("Our website is https://acme.co."));
        assert!(msg.contains("LinkedIn (https://linkedin.com/company/acme)"));
        assert!(msg.contains("Our main goal is: Increase Sales."));
        assert!(!msg.contains("Sales.."));
        assert!(!msg.contains("industry"));
    }

    #[test]
    fn opening_message_for_empty_form_asks_for_basics() {
        let msg = opening_message(&FormData::default());
        assert!(msg.contains("haven't shared any details"));
        assert!(!msg.contains("My company is"));
    }

    #[test]
    fn instructions_mention_gathering_missing_info() {
        assert!(DEFAULT_ASSISTANT_INSTRUCTIONS.contains("gather those conversationally"));
    }
}
