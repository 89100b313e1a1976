use derive_getters::Getters;
use std::fmt::{Display, Formatter};

const SUBMISSION_PORT: u16 = 587;

#[derive(Debug, Getters, PartialEq, Eq, Clone)]
pub struct RelaySettings {
    host: String,
    port: u16,
}

impl RelaySettings {
    pub fn new(host: String, port: u16) -> Self {
        Self { host, port }
    }
}

impl Display for RelaySettings {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}:{}", self.host, self.port)
    }
}

struct RelayRule {
    domain_markers: &'static [&'static str],
    host: &'static str,
    port: u16,
}

/// Known providers, in priority order. The first rule having a marker
/// contained in the sender domain wins.
const RELAY_RULES: &[RelayRule] = &[
    RelayRule {
        domain_markers: &["gmail"],
        host: "smtp.gmail.com",
        port: SUBMISSION_PORT,
    },
    RelayRule {
        domain_markers: &["yahoo"],
        host: "smtp.mail.yahoo.com",
        port: SUBMISSION_PORT,
    },
    RelayRule {
        domain_markers: &["outlook", "hotmail", "live"],
        host: "smtp.office365.com",
        port: SUBMISSION_PORT,
    },
];

/// Guess which relay should carry mails sent by `sender_address`.
/// This is no DNS lookup: unknown domains get `smtp.<domain>`,
/// which may well not exist.
pub fn select_relay(sender_address: &str) -> RelaySettings {
    let domain = sender_domain(sender_address);

    RELAY_RULES
        .iter()
        .find(|rule| {
            rule.domain_markers
                .iter()
                .any(|marker| domain.contains(marker))
        })
        .map(|rule| RelaySettings::new(rule.host.to_owned(), rule.port))
        .unwrap_or_else(|| RelaySettings::new(format!("smtp.{domain}"), SUBMISSION_PORT))
}

/// Lower-cased part after the last `@`, or the whole address when there is none.
pub fn sender_domain(sender_address: &str) -> String {
    sender_address
        .rsplit('@')
        .next()
        .unwrap_or(sender_address)
        .to_lowercase()
}
