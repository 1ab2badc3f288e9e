#[derive(Debug, Clone)]
pub struct Settings {
    pub service_url: String,
    pub page_size: usize,
    pub case_insensitive_filter: bool,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            service_url: "http://127.0.0.1:8443".into(),
            page_size: 10,
            case_insensitive_filter: true,
        }
    }
}

pub fn load_settings() -> Settings {
    let mut settings = Settings::default();

    if let Ok(v) = std::env::var("SUBSCRIPTIONS_SERVICE_URL") {
        settings.service_url = v;
    }
    if let Ok(v) = std::env::var("APP__SERVICE_URL") {
        settings.service_url = v;
    }

    if let Ok(v) = std::env::var("APP__PAGE_SIZE") {
        if let Ok(parsed) = v.parse::<usize>() {
            if parsed > 0 {
                settings.page_size = parsed;
            }
        }
    }

    if let Ok(v) = std::env::var("APP__CASE_SENSITIVE_FILTER") {
        if let Ok(parsed) = v.parse::<bool>() {
            settings.case_insensitive_filter = !parsed;
        }
    }

    settings
}
