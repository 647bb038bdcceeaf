use crate::profile::{HeaderAction, HeaderRule};
use anyhow::{anyhow, Result};
use std::time::Duration;

/// Parse duration string (e.g., "250ms", "30s", "5m", "2h") into Duration
pub fn parse_duration(s: &str) -> Result<Duration> {
    if s.is_empty() {
        return Err(anyhow!("Empty duration string"));
    }

    let (num_str, unit) = if let Some(stripped) = s.strip_suffix("ms") {
        (stripped, "ms")
    } else if let Some(stripped) = s.strip_suffix('s') {
        (stripped, "s")
    } else if let Some(stripped) = s.strip_suffix('m') {
        (stripped, "m")
    } else if let Some(stripped) = s.strip_suffix('h') {
        (stripped, "h")
    } else {
        return Err(anyhow!(
            "Duration must end with 'ms', 's', 'm', or 'h': {}",
            s
        ));
    };

    let num: u64 = num_str
        .parse()
        .map_err(|_| anyhow!("Invalid number in duration: {}", num_str))?;

    let duration = match unit {
        "ms" => Duration::from_millis(num),
        "s" => Duration::from_secs(num),
        "m" => Duration::from_secs(num * 60),
        "h" => Duration::from_secs(num * 3600),
        _ => unreachable!(),
    };

    Ok(duration)
}

/// Parse a header spec of the form `add:Name=value`, `modify:Name=value`
/// or `delete:Name` into a HeaderRule
pub fn parse_header_spec(spec: &str) -> Result<HeaderRule> {
    let (action, rest) = spec
        .split_once(':')
        .ok_or_else(|| anyhow!("Header must look like 'action:Name=value': {}", spec))?;
    let action: HeaderAction = action.parse()?;

    let header = match action {
        HeaderAction::Delete => {
            if rest.contains('=') {
                anyhow::bail!("delete header takes no value: {}", spec);
            }
            HeaderRule::delete(rest)
        }
        _ => {
            let (name, value) = rest
                .split_once('=')
                .ok_or_else(|| anyhow!("{} header requires a value: {}", action.as_str(), spec))?;
            HeaderRule::new(action, name, value)
        }
    };

    Ok(header)
}
