pub mod env {
    pub const APP_ENVIRONMENT_ENV_VAR: &str = "APP_ENVIRONMENT";
    pub const CONFIG_DIR_ENV_VAR: &str = "WARDEN_CONFIG_DIR";
    pub const ENV_PREFIX: &str = "WARDEN";
    pub const ENV_SEPARATOR: &str = "__";
}

pub const DEFAULT_CONFIG_DIR: &str = "config";
pub const BASE_CONFIG_FILE: &str = "base";

pub mod prod {
    pub const APP_ADDRESS: &str = "0.0.0.0:3000";
    pub const REQUEST_TIMEOUT_SECONDS: u64 = 30;
}

pub mod test {
    pub const APP_ADDRESS: &str = "127.0.0.1:0";
}
