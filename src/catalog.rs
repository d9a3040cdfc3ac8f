//! Static service catalog.
//!
//! Maps normalized node-type identifiers to display names for integration
//! detection, and groups those display names into browsable categories.
//!
//! Keys are stored already normalized (lowercased, `trigger` removed), which
//! is the form lookups arrive in. Entries mapping to `None` are utility or
//! control-flow nodes that never count as integrations.
//!
//! Table order is load-bearing: the node-name substring scan walks entries
//! front to back and takes the first hit, so broader keys must come after
//! the specific ones that contain them (`dropbox` before `box`,
//! `googlecalendar` before `cal`, `typeform` before `form`).

/// Node-type identifier to service display name. `None` marks utility nodes.
pub const SERVICE_TABLE: &[(&str, Option<&str>)] = &[
    // Messaging & communication
    ("telegram", Some("Telegram")),
    ("discord", Some("Discord")),
    ("slack", Some("Slack")),
    ("whatsapp", Some("WhatsApp")),
    ("mattermost", Some("Mattermost")),
    ("teams", Some("Microsoft Teams")),
    ("rocketchat", Some("Rocket.Chat")),
    // Email
    ("gmail", Some("Gmail")),
    ("mailjet", Some("Mailjet")),
    ("emailreadimap", Some("Email (IMAP)")),
    ("emailsendsmt", Some("Email (SMTP)")),
    ("outlook", Some("Outlook")),
    // Cloud storage
    ("googledrive", Some("Google Drive")),
    ("googledocs", Some("Google Docs")),
    ("googlesheets", Some("Google Sheets")),
    ("dropbox", Some("Dropbox")),
    ("onedrive", Some("OneDrive")),
    ("box", Some("Box")),
    // Databases
    ("postgres", Some("PostgreSQL")),
    ("mysql", Some("MySQL")),
    ("mongodb", Some("MongoDB")),
    ("redis", Some("Redis")),
    ("airtable", Some("Airtable")),
    ("notion", Some("Notion")),
    // Project management
    ("jira", Some("Jira")),
    ("github", Some("GitHub")),
    ("gitlab", Some("GitLab")),
    ("trello", Some("Trello")),
    ("asana", Some("Asana")),
    ("mondaycom", Some("Monday.com")),
    // AI / ML
    ("openai", Some("OpenAI")),
    ("anthropic", Some("Anthropic")),
    ("huggingface", Some("Hugging Face")),
    // Social media
    ("linkedin", Some("LinkedIn")),
    ("twitter", Some("Twitter/X")),
    ("facebook", Some("Facebook")),
    ("instagram", Some("Instagram")),
    // E-commerce
    ("shopify", Some("Shopify")),
    ("stripe", Some("Stripe")),
    ("paypal", Some("PayPal")),
    // Analytics
    ("googleanalytics", Some("Google Analytics")),
    ("mixpanel", Some("Mixpanel")),
    // Calendar & tasks
    ("googlecalendar", Some("Google Calendar")),
    ("googletasks", Some("Google Tasks")),
    ("cal", Some("Cal.com")),
    ("calendly", Some("Calendly")),
    // Forms & surveys
    ("typeform", Some("Typeform")),
    ("googleforms", Some("Google Forms")),
    ("form", Some("Form Trigger")),
    // Development tools
    ("webhook", Some("Webhook")),
    ("httprequest", Some("HTTP Request")),
    ("graphql", Some("GraphQL")),
    ("sse", Some("Server-Sent Events")),
    // Utility nodes (never integrations)
    ("set", None),
    ("function", None),
    ("code", None),
    ("if", None),
    ("switch", None),
    ("merge", None),
    ("split", None),
    ("stickynote", None),
    ("wait", None),
    ("schedule", None),
    ("cron", None),
    ("manual", None),
    ("stopanderror", None),
    ("noop", None),
    ("error", None),
    ("limit", None),
    ("aggregate", None),
    ("summarize", None),
    ("filter", None),
    ("sort", None),
    ("removeduplicates", None),
    ("datetime", None),
    ("extractfromfile", None),
    ("converttofile", None),
    ("readbinaryfile", None),
    ("readbinaryfiles", None),
    ("executiondata", None),
    ("executeworkflow", None),
    ("executecommand", None),
    ("respondtowebhook", None),
];

/// Service display names grouped for category search.
pub const SERVICE_CATEGORIES: &[(&str, &[&str])] = &[
    (
        "messaging",
        &[
            "Telegram",
            "Discord",
            "Slack",
            "WhatsApp",
            "Mattermost",
            "Microsoft Teams",
            "Rocket.Chat",
        ],
    ),
    (
        "email",
        &["Gmail", "Mailjet", "Email (IMAP)", "Email (SMTP)", "Outlook"],
    ),
    (
        "cloud_storage",
        &[
            "Google Drive",
            "Google Docs",
            "Google Sheets",
            "Dropbox",
            "OneDrive",
            "Box",
        ],
    ),
    (
        "database",
        &["PostgreSQL", "MySQL", "MongoDB", "Redis", "Airtable", "Notion"],
    ),
    (
        "project_management",
        &["Jira", "GitHub", "GitLab", "Trello", "Asana", "Monday.com"],
    ),
    ("ai_ml", &["OpenAI", "Anthropic", "Hugging Face"]),
    (
        "social_media",
        &["LinkedIn", "Twitter/X", "Facebook", "Instagram"],
    ),
    ("ecommerce", &["Shopify", "Stripe", "PayPal"]),
    ("analytics", &["Google Analytics", "Mixpanel"]),
    (
        "calendar_tasks",
        &["Google Calendar", "Google Tasks", "Cal.com", "Calendly"],
    ),
    ("forms", &["Typeform", "Google Forms", "Form Trigger"]),
    (
        "development",
        &[
            "Webhook",
            "HTTP Request",
            "GraphQL",
            "Server-Sent Events",
            "YouTube",
        ],
    ),
];

/// Looks up a normalized node-type key.
///
/// `Some(Some(name))` is a mapped service, `Some(None)` a utility node, and
/// `None` a key the table does not know.
pub fn lookup_service(key: &str) -> Option<Option<&'static str>> {
    SERVICE_TABLE
        .iter()
        .find(|(k, _)| *k == key)
        .map(|(_, v)| *v)
}

/// Returns the services of a category, or `None` for an unknown category.
pub fn category_services(category: &str) -> Option<&'static [&'static str]> {
    SERVICE_CATEGORIES
        .iter()
        .find(|(name, _)| *name == category)
        .map(|(_, services)| *services)
}

/// Print the category catalog for the `fdx categories` command.
pub fn run_categories(show_services: bool) {
    println!("{:<20} SERVICES", "CATEGORY");
    for (name, services) in SERVICE_CATEGORIES {
        println!("{:<20} {}", name, services.len());
        if show_services {
            for service in *services {
                println!("    {}", service);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lookup_mapped_service() {
        assert_eq!(lookup_service("slack"), Some(Some("Slack")));
        assert_eq!(lookup_service("httprequest"), Some(Some("HTTP Request")));
        assert_eq!(lookup_service("emailsendsmt"), Some(Some("Email (SMTP)")));
    }

    #[test]
    fn test_lookup_utility_is_excluded() {
        assert_eq!(lookup_service("stickynote"), Some(None));
        assert_eq!(lookup_service("noop"), Some(None));
        assert_eq!(lookup_service("respondtowebhook"), Some(None));
    }

    #[test]
    fn test_lookup_unknown_key() {
        assert_eq!(lookup_service("notaservice"), None);
    }

    #[test]
    fn test_specific_keys_precede_their_substrings() {
        // The name scan is first-match-wins, so these orderings keep
        // "Dropbox backup" from matching Box, and so on.
        let position = |key: &str| {
            SERVICE_TABLE
                .iter()
                .position(|(k, _)| *k == key)
                .unwrap_or_else(|| panic!("missing key {}", key))
        };
        assert!(position("dropbox") < position("box"));
        assert!(position("googlecalendar") < position("cal"));
        assert!(position("typeform") < position("form"));
    }

    #[test]
    fn test_category_lookup() {
        let messaging = category_services("messaging").unwrap();
        assert!(messaging.contains(&"Slack"));
        assert!(messaging.contains(&"Rocket.Chat"));
        assert!(category_services("nonexistent").is_none());
    }

    #[test]
    fn test_every_category_service_is_reachable_or_custom() {
        // YouTube comes from the custom-node path rather than the table;
        // everything else in the categories must be a table value.
        let table_values: Vec<&str> = SERVICE_TABLE.iter().filter_map(|(_, v)| *v).collect();
        for (_, services) in SERVICE_CATEGORIES {
            for service in *services {
                if *service == "YouTube" {
                    continue;
                }
                assert!(
                    table_values.contains(service),
                    "category service {} has no table entry",
                    service
                );
            }
        }
    }
}
