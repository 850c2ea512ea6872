use std::fmt::Write;

use crate::profile::Profile;
use crate::query::{Notification, QueryResult};

pub const NOT_AVAILABLE: &str = "Not Available";
pub const NO_BIO: &str = "This profile has no bio";

/// Text for the current lookup state. Idle and failed lookups render
/// nothing; a failure is shown through its notification instead.
pub fn render_result(result: &QueryResult) -> String {
    match result {
        QueryResult::NotAsked | QueryResult::Failure(_) => String::new(),
        QueryResult::Loading { username } => format!("Loading {}...", username),
        QueryResult::Success { profile, .. } => render_profile(profile),
    }
}

pub fn render_profile(profile: &Profile) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "{}", profile.display_name());
    let _ = writeln!(out, "@{}", profile.login);
    let _ = writeln!(out, "Joined {}", profile.created_at.format("%-d %b %Y"));
    let _ = writeln!(out, "Avatar: {}", profile.avatar_url);
    let _ = writeln!(out);
    let _ = writeln!(out, "{}", profile.bio.as_deref().unwrap_or(NO_BIO));
    let _ = writeln!(out);
    let _ = writeln!(
        out,
        "Repos: {}  Followers: {}  Following: {}",
        profile.public_repos, profile.followers, profile.following
    );
    let _ = writeln!(out);
    let _ = writeln!(out, "Location: {}", or_not_available(profile.location.as_deref()));
    let _ = writeln!(out, "Website:  {}", or_not_available(profile.blog_url()));
    let _ = writeln!(
        out,
        "Twitter:  {}",
        or_not_available(profile.twitter_username.as_deref())
    );
    let _ = writeln!(out, "Company:  {}", or_not_available(profile.company.as_deref()));
    let _ = write!(out, "Profile:  {}", or_not_available(profile.html_url.as_deref()));
    out
}

pub fn render_notification(notification: &Notification) -> String {
    format!("[!] {}", notification.text)
}

fn or_not_available(value: Option<&str>) -> &str {
    value.unwrap_or(NOT_AVAILABLE)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::client::ProcedureFailure;
    use crate::query::QueryFailure;
    use serde_json::json;

    fn profile(overrides: serde_json::Value) -> Profile {
        let mut base = json!({
            "login": "octocat",
            "name": "The Octocat",
            "avatar_url": "https://avatars.githubusercontent.com/u/583231?v=4",
            "bio": null,
            "location": "San Francisco",
            "company": "@github",
            "blog": "https://github.blog",
            "html_url": "https://github.com/octocat",
            "twitter_username": null,
            "public_repos": 8,
            "followers": 9999,
            "following": 9,
            "created_at": "2011-01-25T18:44:36Z"
        });
        for (k, v) in overrides.as_object().unwrap() {
            base[k] = v.clone();
        }
        serde_json::from_value(base).unwrap()
    }

    #[test]
    fn test_profile_card_fields() {
        let card = render_profile(&profile(json!({})));
        assert!(card.starts_with("The Octocat\n@octocat\n"));
        assert!(card.contains("Joined 25 Jan 2011"));
        assert!(card.contains(NO_BIO));
        assert!(card.contains("Repos: 8  Followers: 9999  Following: 9"));
        assert!(card.contains("Location: San Francisco"));
        assert!(card.contains("Twitter:  Not Available"));
        assert!(card.ends_with("Profile:  https://github.com/octocat"));
    }

    #[test]
    fn test_missing_profile_link_renders_not_available() {
        let card = render_profile(&profile(json!({"html_url": null})));
        assert!(card.contains("Profile:  Not Available"));
    }

    #[test]
    fn test_null_location_renders_not_available() {
        let card = render_profile(&profile(json!({"location": null})));
        assert!(card.contains("Location: Not Available"));
    }

    #[test]
    fn test_empty_blog_renders_not_available() {
        let card = render_profile(&profile(json!({"blog": ""})));
        assert!(card.contains("Website:  Not Available"));
    }

    #[test]
    fn test_states_without_card() {
        assert_eq!(render_result(&QueryResult::NotAsked), "");
        let failure = QueryResult::Failure(QueryFailure::new(
            "ghost".into(),
            &ProcedureFailure::new("Not Found"),
        ));
        assert_eq!(render_result(&failure), "");
        assert_eq!(
            render_result(&QueryResult::Loading {
                username: "octocat".into()
            }),
            "Loading octocat..."
        );
    }
}
