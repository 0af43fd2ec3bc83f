//! pixiv markup the Chromium session relies on

pub const USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/110.0.0.0 Safari/537.36";
pub const ACCEPT_LANGUAGE: &str = "en-US,en;q=0.9";

pub const LOGIN_TEXT: &str = "Login";
pub const USERNAME_INPUT: &str = r#"input[type="text"]"#;
pub const PASSWORD_INPUT: &str = r#"input[type="password"]"#;
pub const SUBMIT_BUTTON: &str = r#"button[type="submit"]"#;

/// Avatar button, only rendered once logged in
pub const AVATAR_BUTTON: &str = "button div[title]";
pub const FOLLOWING_LINK: &str = r#"a[href^="/en/users/"][href$="following"]"#;
pub const PRIVATE_TAB_TEXT: &str = "Private";

pub const LISTING_LINK: &str = r#"section a[href^="/en/users/"]"#;
pub const NEXT_PAGE_ICON: &str = "nav > a:last-child > svg";

pub const FOLLOW_TEXT: &str = "Follow";
pub const FOLLOW_PRIVATELY_TEXT: &str = "Follow privately";

pub fn home_url(base_url: &str) -> String {
    format!("{}/en/", base_url)
}

pub fn profile_url(base_url: &str, id: &str) -> String {
    format!("{}/en/users/{}", base_url, id)
}
