//! Presence checks over container env vars and command-line arguments.

use k8s_openapi::api::core::v1::EnvVar;

/// True if an env var named `key` is set, whatever its value.
pub fn has_env_key(env: &[EnvVar], key: &str) -> bool {
    env.iter().any(|e| e.name == key)
}

/// True if an env var named `key` has exactly `value`.
pub fn has_env_kv(env: &[EnvVar], key: &str, value: &str) -> bool {
    env.iter()
        .any(|e| e.name == key && e.value.as_deref().unwrap_or_default() == value)
}

fn strip_quotes(arg: &str) -> String {
    arg.replace(['\'', '"'], "")
}

/// True if `args` contain `--key=<any>` or `--key <any>`.
///
/// `key` may be given with or without its leading `--`.
pub fn has_arg_key(args: &[String], key: &str) -> bool {
    let key = key.strip_prefix("--").unwrap_or(key);
    let flag = format!("--{}", key);
    let with_value = format!("--{}=", key);
    args.iter().enumerate().any(|(i, arg)| {
        let arg = strip_quotes(arg);
        arg.starts_with(&with_value) || (arg == flag && i + 1 < args.len())
    })
}

/// True if `args` contain `--key=value` or `--key value`.
pub fn has_arg_kv(args: &[String], key: &str, value: &str) -> bool {
    let key = key.strip_prefix("--").unwrap_or(key);
    let flag = format!("--{}", key);
    let joined = format!("--{}={}", key, value);
    args.iter().enumerate().any(|(i, arg)| {
        let arg = strip_quotes(arg);
        if arg == joined {
            return true;
        }
        arg == flag && args.get(i + 1).map(|next| strip_quotes(next) == value).unwrap_or(false)
    })
}
