//! Canned replies used when the completion service is unreachable.
//!
//! Rules are checked in order and the first whose pattern matches the user's
//! message wins, so the same input always yields the same reply.

use regex::Regex;
use tracing::debug;

/// A keyword rule with its canned reply.
#[derive(Debug, Clone)]
pub struct FallbackRule {
    /// Short name for logs.
    pub topic: String,
    pub regex: Regex,
    pub reply: String,
}

/// Ordered keyword table plus a default reply.
#[derive(Debug, Clone)]
pub struct FallbackTable {
    rules: Vec<FallbackRule>,
    default_reply: String,
}

const DEFAULT_REPLY: &str = "I can't reach the planning assistant right now, but your \
conversation is saved. Meanwhile, try writing down your top three priorities for this \
project and what success looks like in 90 days. Send another message in a moment and \
I'll pick up from there.";

impl FallbackTable {
    /// The built-in table for business-planning conversations.
    pub fn default_rules() -> Self {
        let rule = |topic: &str, pattern: &str, reply: &str| FallbackRule {
            topic: topic.into(),
            regex: Regex::new(pattern).unwrap(),
            reply: reply.into(),
        };

        let rules = vec![
            rule(
                "greeting",
                r"(?i)^\s*(hi|hello|hey|good (morning|afternoon|evening))\b",
                "Hi! I'm your plan assistant. Tell me about your business and what you \
                 want to achieve, and we'll turn it into a step-by-step plan.",
            ),
            rule(
                "tools",
                r"(?i)\b(tools?|software|apps?|platforms?|stack)\b",
                "Useful tools depend on the stage you're at. For planning, a shared \
                 document and a simple task board go a long way. For marketing, pair an \
                 email platform with a social scheduler. For sales, a lightweight CRM \
                 keeps leads from slipping through the cracks.",
            ),
            rule(
                "budget",
                r"(?i)\b(budget|cost|costs|price|pricing|money|spend)\b",
                "A good starting point for a budget is to list fixed costs first, then \
                 set aside a test budget for one or two channels. Measure cost per lead \
                 for a few weeks before scaling what works.",
            ),
            rule(
                "marketing",
                r"(?i)\b(marketing|seo|ads?|advertis\w*|campaigns?|brand\w*)\b",
                "Strong marketing plans start with one clear audience and one message. \
                 Pick the channel where that audience already spends time, publish \
                 consistently, and track which posts bring real conversations.",
            ),
            rule(
                "social",
                r"(?i)\b(social|instagram|linkedin|twitter|facebook|tiktok)\b",
                "For social media, consistency beats volume. Choose one or two networks \
                 your customers use, plan a weekly posting rhythm, and reuse your best \
                 content across formats.",
            ),
            rule(
                "website",
                r"(?i)\b(website|site|landing page|domain)\b",
                "Your website should answer three questions within seconds: what you \
                 do, who it's for, and what to do next. Make the main call to action \
                 obvious on every page.",
            ),
            rule(
                "sales",
                r"(?i)\b(sales|sell|revenue|customers?|leads?)\b",
                "To grow sales, map the steps a customer takes from first hearing about \
                 you to buying. Find the step where most people drop off and improve \
                 that one first.",
            ),
            rule(
                "timeline",
                r"(?i)\b(timeline|deadline|schedule|when|how long|weeks?|months?)\b",
                "Break the plan into 30, 60 and 90 day milestones. Each milestone should \
                 have one measurable outcome and a named owner.",
            ),
        ];

        Self {
            rules,
            default_reply: DEFAULT_REPLY.to_string(),
        }
    }

    /// A table with no keyword rules, only the default reply.
    pub fn with_default(default_reply: impl Into<String>) -> Self {
        Self {
            rules: Vec::new(),
            default_reply: default_reply.into(),
        }
    }

    /// Append a rule after the existing ones.
    pub fn add_rule(&mut self, topic: &str, pattern: &str, reply: &str) -> Result<(), regex::Error> {
        self.rules.push(FallbackRule {
            topic: topic.into(),
            regex: Regex::new(pattern)?,
            reply: reply.into(),
        });
        Ok(())
    }

    /// Pick the canned reply for a user message. Never empty.
    pub fn reply_for(&self, message: &str) -> &str {
        for rule in &self.rules {
            if rule.regex.is_match(message) {
                debug!(topic = %rule.topic, "Fallback rule matched");
                return &rule.reply;
            }
        }
        &self.default_reply
    }
}

impl Default for FallbackTable {
    fn default() -> Self {
        Self::default_rules()
    }
}
