//! Security rule set.
//!
//! The rules are sent to the provider with every evaluation and applied
//! again locally, so an allow-listed agent is never rejected for being a
//! bot even if the provider ignores the allow-list. Only the provider's
//! classification can vouch for a search engine; user-agent signatures
//! cover internal callers the provider did not classify.

use serde::Serialize;

use crate::config::{AgentSignature, RuleMode, SecurityConfig};
use crate::shield::types::{BotReport, RejectReason};

const CATEGORY_PREFIX: &str = "CATEGORY:";

/// A rule as understood by the provider.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Rule {
    Shield { mode: RuleMode },
    DetectBot { mode: RuleMode, allow: Vec<String> },
}

/// Rules plus the local allow-list matchers.
#[derive(Debug, Clone)]
pub struct RuleSet {
    rules: Vec<Rule>,
    agent_signatures: Vec<AgentSignature>,
}

impl RuleSet {
    pub fn from_config(config: &SecurityConfig) -> Self {
        Self {
            rules: vec![
                Rule::Shield { mode: config.shield_mode },
                Rule::DetectBot {
                    mode: config.bot_mode,
                    allow: config.allow.clone(),
                },
            ],
            agent_signatures: config.agent_signatures.clone(),
        }
    }

    pub fn rules(&self) -> &[Rule] {
        &self.rules
    }

    /// Mode of the rule responsible for a rejection reason.
    /// Reasons without a configured rule are enforced.
    pub fn mode_for(&self, reason: RejectReason) -> RuleMode {
        self.rules
            .iter()
            .find_map(|rule| match (rule, reason) {
                (Rule::Shield { mode }, RejectReason::Shield) => Some(*mode),
                (Rule::DetectBot { mode, .. }, RejectReason::Bot) => Some(*mode),
                _ => None,
            })
            .unwrap_or(RuleMode::Live)
    }

    fn allow_list(&self) -> &[String] {
        self.rules
            .iter()
            .find_map(|rule| match rule {
                Rule::DetectBot { allow, .. } => Some(allow.as_slice()),
                _ => None,
            })
            .unwrap_or(&[])
    }

    /// Returns true if the client is an allow-listed automated agent.
    ///
    /// A provider report is authoritative. The local user-agent signatures
    /// are only consulted when the provider did not classify the client.
    pub fn is_allowed_agent(&self, bot: Option<&BotReport>, user_agent: Option<&str>) -> bool {
        match bot {
            Some(bot) => self.allow_list().iter().any(|entry| {
                if entry.starts_with(CATEGORY_PREFIX) {
                    bot.categories.iter().any(|c| same_category(c, entry))
                } else {
                    bot.identifiers.iter().any(|id| id == entry)
                }
            }),
            None => user_agent.is_some_and(|ua| {
                self.allow_list().iter().any(|entry| {
                    self.agent_signatures
                        .iter()
                        .filter(|sig| sig.id == *entry)
                        .any(|sig| ua.contains(sig.user_agent_contains.as_str()))
                })
            }),
        }
    }
}

fn same_category(reported: &str, entry: &str) -> bool {
    let strip = |s: &str| s.strip_prefix(CATEGORY_PREFIX).unwrap_or(s).to_string();
    strip(reported) == strip(entry)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rules() -> RuleSet {
        RuleSet::from_config(&SecurityConfig::default())
    }

    #[test]
    fn modes_follow_config() {
        let mut config = SecurityConfig::default();
        config.bot_mode = RuleMode::DryRun;
        let rules = RuleSet::from_config(&config);

        assert_eq!(rules.mode_for(RejectReason::Bot), RuleMode::DryRun);
        assert_eq!(rules.mode_for(RejectReason::Shield), RuleMode::Live);
        assert_eq!(rules.mode_for(RejectReason::RateLimit), RuleMode::Live);
    }

    #[test]
    fn allow_by_provider_category() {
        let report = BotReport {
            identifiers: vec!["GOOGLE_CRAWLER".into()],
            categories: vec!["SEARCH_ENGINE".into()],
        };
        assert!(rules().is_allowed_agent(Some(&report), Some("Mozilla/5.0")));
    }

    #[test]
    fn allow_by_provider_identifier() {
        let report = BotReport {
            identifiers: vec!["GO_HTTP".into()],
            categories: vec!["CATEGORY:TOOL".into()],
        };
        assert!(rules().is_allowed_agent(Some(&report), None));
    }

    #[test]
    fn allow_by_user_agent_signature() {
        assert!(rules().is_allowed_agent(None, Some("Go-http-client/2.0")));
    }

    #[test]
    fn crawler_user_agent_alone_is_not_trusted() {
        assert!(!rules().is_allowed_agent(
            None,
            Some("Mozilla/5.0 (compatible; Googlebot/2.1; +http://www.google.com/bot.html)")
        ));
    }

    #[test]
    fn provider_report_overrides_user_agent() {
        let report = BotReport {
            identifiers: vec!["CURL".into()],
            categories: vec!["CATEGORY:TOOL".into()],
        };
        assert!(!rules().is_allowed_agent(Some(&report), Some("curl/8.4.0 Googlebot")));
        assert!(!rules().is_allowed_agent(Some(&report), Some("Go-http-client/1.1")));
    }

    #[test]
    fn other_bots_are_not_allowed() {
        let report = BotReport {
            identifiers: vec!["CURL".into()],
            categories: vec!["CATEGORY:TOOL".into()],
        };
        assert!(!rules().is_allowed_agent(Some(&report), Some("curl/8.4.0")));
        assert!(!rules().is_allowed_agent(None, None));
    }

    #[test]
    fn signatures_only_count_for_listed_entries() {
        let mut config = SecurityConfig::default();
        config.allow = vec!["CATEGORY:SEARCH_ENGINE".into()];
        let rules = RuleSet::from_config(&config);
        assert!(!rules.is_allowed_agent(None, Some("Go-http-client/1.1")));
    }

    #[test]
    fn rules_serialize_for_provider() {
        let json = serde_json::to_value(rules().rules()).unwrap();
        assert_eq!(json[0]["type"], "shield");
        assert_eq!(json[0]["mode"], "live");
        assert_eq!(json[1]["type"], "detect_bot");
        assert_eq!(json[1]["allow"][1], "GO_HTTP");
    }
}
