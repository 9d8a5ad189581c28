pub const DEFAULT_IAM_URL: &str = "https://iam.cloud.ibm.com/identity/token";
pub const DEFAULT_MODEL_ID: &str = "ibm/granite-13b-chat-v2";
pub const DEFAULT_API_VERSION: &str = "2023-05-29";
pub const DEFAULT_PORT: u16 = 8501;

#[derive(Debug, Clone)]
pub struct Config {
    pub port: u16,
    /// Long-lived IBM Cloud API key, exchanged for a bearer token.
    /// Set via WATSONX_API_KEY. Never logged.
    pub api_key: Option<String>,
    /// Base URL of the generation service, e.g. `https://us-south.ml.cloud.ibm.com`.
    /// Set via WATSONX_URL.
    pub base_url: Option<String>,
    /// Set via WATSONX_MODEL_ID. Default: ibm/granite-13b-chat-v2.
    pub model_id: String,
    /// Identity endpoint. Only overridden in tests and air-gapped setups.
    pub iam_url: String,
    /// `version=` query parameter sent with every generation call.
    pub api_version: String,
}

impl Config {
    /// Config with the fixed defaults and the two required settings filled in.
    pub fn new(api_key: Option<String>, base_url: Option<String>) -> Self {
        Self {
            port: DEFAULT_PORT,
            api_key: non_empty(api_key),
            base_url: non_empty(base_url).map(|u| u.trim_end_matches('/').to_string()),
            model_id: DEFAULT_MODEL_ID.to_string(),
            iam_url: DEFAULT_IAM_URL.to_string(),
            api_version: DEFAULT_API_VERSION.to_string(),
        }
    }

    pub fn with_iam_url(mut self, iam_url: impl Into<String>) -> Self {
        self.iam_url = iam_url.into();
        self
    }

    pub fn with_model_id(mut self, model_id: impl Into<String>) -> Self {
        self.model_id = model_id.into();
        self
    }

    /// Human-readable problems with the required settings.
    /// These are shown on screen; they never stop the process.
    pub fn warnings(&self) -> Vec<String> {
        let mut out = Vec::new();
        if self.api_key.is_none() {
            out.push(
                "WATSONX_API_KEY is not set — requests cannot be authenticated.".to_string(),
            );
        }
        match &self.base_url {
            None => out.push(
                "WATSONX_URL is not set — there is no endpoint to send prompts to.".to_string(),
            ),
            Some(u) if url::Url::parse(u).is_err() => {
                out.push(format!("WATSONX_URL '{}' is not a valid URL.", u));
            }
            Some(_) => {}
        }
        out
    }
}

fn non_empty(v: Option<String>) -> Option<String> {
    v.map(|s| s.trim().to_string()).filter(|s| !s.is_empty())
}

pub fn load() -> anyhow::Result<Config> {
    dotenvy::dotenv().ok();

    let mut cfg = Config::new(
        std::env::var("WATSONX_API_KEY").ok(),
        std::env::var("WATSONX_URL").ok(),
    );

    cfg.port = std::env::var("BUDGET_COACH_PORT")
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(DEFAULT_PORT);
    if let Some(model) = non_empty(std::env::var("WATSONX_MODEL_ID").ok()) {
        cfg.model_id = model;
    }
    if let Some(iam) = non_empty(std::env::var("WATSONX_IAM_URL").ok()) {
        url::Url::parse(&iam)
            .map_err(|e| anyhow::anyhow!("WATSONX_IAM_URL '{}' is invalid: {}", iam, e))?;
        cfg.iam_url = iam;
    }
    if let Some(version) = non_empty(std::env::var("WATSONX_API_VERSION").ok()) {
        cfg.api_version = version;
    }

    for w in cfg.warnings() {
        tracing::warn!("{}", w);
    }

    Ok(cfg)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_settings_produce_warnings() {
        let cfg = Config::new(None, None);
        let warnings = cfg.warnings();
        assert_eq!(warnings.len(), 2);
        assert!(warnings[0].contains("WATSONX_API_KEY"));
        assert!(warnings[1].contains("WATSONX_URL"));
    }

    #[test]
    fn test_blank_values_count_as_missing() {
        let cfg = Config::new(Some("   ".into()), Some(String::new()));
        assert!(cfg.api_key.is_none());
        assert!(cfg.base_url.is_none());
    }

    #[test]
    fn test_invalid_base_url_is_reported() {
        let cfg = Config::new(Some("key".into()), Some("not a url".into()));
        let warnings = cfg.warnings();
        assert_eq!(warnings.len(), 1);
        assert!(warnings[0].contains("not a valid URL"));
    }

    #[test]
    fn test_complete_config_has_no_warnings() {
        let cfg = Config::new(
            Some("key".into()),
            Some("https://us-south.ml.cloud.ibm.com/".into()),
        );
        assert!(cfg.warnings().is_empty());
        assert_eq!(cfg.base_url.as_deref(), Some("https://us-south.ml.cloud.ibm.com"));
        assert_eq!(cfg.model_id, DEFAULT_MODEL_ID);
        assert_eq!(cfg.iam_url, DEFAULT_IAM_URL);
    }
}
