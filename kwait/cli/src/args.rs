use std::{path::PathBuf, time::Duration};

use clap::Parser;

/// Wait for Kubernetes resources to exist, disappear or become ready.
///
/// Each condition is `kind/[namespace/]name[/condition]`, where `name` may
/// be `*` and `condition` is one of `exists`, `gone` or `ready` (default).
#[derive(Parser, Debug)]
#[command(name = "kwait", version)]
pub struct Args {
    /// Kubeconfig file; inferred from the environment when omitted.
    #[arg(long, value_name = "PATH")]
    pub kubeconfig: Option<PathBuf>,

    /// Shared deadline for all conditions.
    #[arg(
        long,
        env = "KWAIT_TIMEOUT",
        default_value = "10m",
        value_parser = humantime::parse_duration,
    )]
    pub timeout: Duration,

    /// Delay between two checks of the same condition.
    #[arg(
        long,
        env = "KWAIT_INTERVAL",
        default_value = "1s",
        value_parser = parse_interval,
    )]
    pub interval: Duration,

    /// Log at debug level unless RUST_LOG says otherwise.
    #[arg(long)]
    pub debug: bool,

    /// Conditions to wait for, e.g. `deploy/default/api` or `ns/*/gone`.
    #[arg(value_name = "CONDITION")]
    pub conditions: Vec<String>,
}

fn parse_interval(raw: &str) -> Result<Duration, String> {
    let interval = humantime::parse_duration(raw).map_err(|err| err.to_string())?;
    if interval.is_zero() {
        return Err("interval must be greater than zero".to_owned());
    }
    Ok(interval)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn durations_use_humantime_syntax() {
        let args = Args::try_parse_from([
            "kwait",
            "--timeout",
            "1m30s",
            "--interval",
            "500ms",
            "pod/default/web",
        ])
        .unwrap();

        assert_eq!(args.timeout, Duration::from_secs(90));
        assert_eq!(args.interval, Duration::from_millis(500));
        assert_eq!(args.conditions, ["pod/default/web"]);
        assert!(args.kubeconfig.is_none());
    }

    #[test]
    fn zero_interval_is_rejected() {
        let err = Args::try_parse_from(["kwait", "--interval", "0s", "ns/*/gone"]).unwrap_err();
        assert!(err.to_string().contains("greater than zero"));
    }

    #[test]
    fn malformed_duration_is_rejected() {
        assert!(Args::try_parse_from(["kwait", "--timeout", "soon", "ns/*/gone"]).is_err());
    }
}
