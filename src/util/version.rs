pub const APP_NAME: &str = "Moonlight Tools";
pub const APP_REPO_URL: &str = "https://moonlight.one";
pub const APP_VERSION: &str = env!("CARGO_PKG_VERSION");
pub const GIT_TAG: Option<&str> = option_env!("GIT_TAG");

/// Release tag when built from one, else the package version plus commit.
pub fn version_label() -> String {
    match GIT_TAG {
        Some(tag) if tag.starts_with('v') => tag.to_string(),
        Some(commit) => format!("v{APP_VERSION} ({commit})"),
        None => format!("v{APP_VERSION}"),
    }
}

pub fn banner() -> String {
    format!("{} {} ({})", APP_NAME, version_label(), APP_REPO_URL)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn label_mentions_package_version_or_tag() {
        let label = version_label();
        assert!(label.starts_with('v'));
        assert!(banner().contains(&label));
    }
}
