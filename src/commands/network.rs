//! Network commands: public IP lookup, HTTP status check, port scan, TCP ping
//!
//! Timeout and retry policy comes from [`Settings`]; each command is a
//! one-shot blocking call with no dispatcher-level retry.

use std::net::{IpAddr, SocketAddr, TcpStream, ToSocketAddrs};
use std::time::{Duration, Instant};

use colored::Colorize;
use reqwest::blocking::Client;
use tracing::debug;

use super::{HandlerError, HandlerResult};
use crate::cli::args::HttpMethod;
use crate::cli::report::Report;
use crate::config::Settings;

/// Blocking HTTP client with the configured timeout.
pub(crate) fn http_client(settings: &Settings) -> Result<Client, HandlerError> {
    Client::builder()
        .timeout(Duration::from_secs(settings.network.timeout_secs))
        .build()
        .map_err(|e| HandlerError::Network(format!("could not build HTTP client: {e}")))
}

/// Fetch the public IP from the configured JSON API, retrying per settings.
pub fn ip(settings: &Settings) -> HandlerResult {
    let client = http_client(settings)?;
    let attempts = settings.network.max_retries.saturating_add(1);

    let mut last_error = String::new();
    for attempt in 1..=attempts {
        debug!(attempt, url = %settings.api.ip_api, "fetching public ip");
        let result = client
            .get(&settings.api.ip_api)
            .send()
            .and_then(|r| r.error_for_status())
            .and_then(|r| r.json::<serde_json::Value>());

        match result {
            Ok(body) => {
                let address = body
                    .get("ip")
                    .and_then(|v| v.as_str())
                    .unwrap_or("unknown")
                    .to_string();
                return Ok(Report::key_value(
                    "Public IP address",
                    vec![("Address", address)],
                ));
            }
            Err(e) => last_error = e.to_string(),
        }
    }

    Err(HandlerError::Network(format!(
        "could not fetch public IP after {attempts} attempt(s): {last_error}"
    )))
}

/// Send one request and report status, latency, and selected headers.
pub fn http_check(url: &str, method: HttpMethod, settings: &Settings) -> HandlerResult {
    let url = normalize_url(url);
    debug!(%url, method = method.as_str(), "http check");

    let client = http_client(settings)?;
    let request = match method {
        HttpMethod::Get => client.get(&url),
        HttpMethod::Post => client.post(&url),
        HttpMethod::Head => client.head(&url),
    };

    let started = Instant::now();
    let response = request
        .send()
        .map_err(|e| HandlerError::Network(format!("request to {url} failed: {e}")))?;
    let elapsed = started.elapsed();

    let status = response.status();
    let status_text = if status.as_u16() < 300 {
        status.to_string().green().to_string()
    } else if status.as_u16() < 400 {
        status.to_string().yellow().to_string()
    } else {
        status.to_string().red().to_string()
    };

    let panel = Report::key_value(
        "HTTP status check",
        vec![
            ("URL", url.clone()),
            ("Method", method.as_str().to_string()),
            ("Status", status_text),
            ("Response time", format!("{:.3}s", elapsed.as_secs_f64())),
        ],
    );

    const SHOWN: [&str; 5] = ["content-type", "content-length", "server", "date", "cache-control"];
    let rows: Vec<Vec<String>> = SHOWN
        .iter()
        .filter_map(|name| {
            response.headers().get(*name).map(|value| {
                vec![
                    name.to_string(),
                    value.to_str().unwrap_or("<binary>").to_string(),
                ]
            })
        })
        .collect();

    if rows.is_empty() {
        Ok(panel)
    } else {
        Ok(Report::Multi(vec![
            panel,
            Report::table("Response headers", vec!["Header", "Value"], rows),
        ]))
    }
}

/// TCP connect scan over an inclusive port range.
pub fn port_scan(host: &str, start_port: u16, end_port: u16, timeout_ms: u64) -> HandlerResult {
    if start_port > end_port {
        return Err(HandlerError::InvalidInput(format!(
            "invalid port range: {start_port} > {end_port}"
        )));
    }

    let address = resolve(host)?;
    let timeout = Duration::from_millis(timeout_ms);
    debug!(%address, start_port, end_port, "scanning ports");

    let mut open = Vec::new();
    for port in start_port..=end_port {
        let target = SocketAddr::new(address, port);
        if TcpStream::connect_timeout(&target, timeout).is_ok() {
            open.push(port);
        }
    }

    if open.is_empty() {
        return Ok(Report::text(format!(
            "No open ports on {host} in range {start_port}-{end_port}"
        )));
    }

    let rows = open
        .iter()
        .map(|port| vec![port.to_string(), well_known_service(*port).to_string()])
        .collect();

    Ok(Report::Multi(vec![
        Report::table(
            format!("Open ports on {host}"),
            vec!["Port", "Service"],
            rows,
        ),
        Report::text(format!(
            "Found {} open port(s) in range {start_port}-{end_port}",
            open.len()
        )),
    ]))
}

/// Reachability probe: timed TCP connects to port 80.
pub fn ping(host: &str, count: u32, settings: &Settings) -> HandlerResult {
    let address = resolve(host)?;
    let timeout = Duration::from_secs(settings.network.timeout_secs);
    debug!(%address, count, "tcp ping");

    let target = SocketAddr::new(address, 80);
    let mut successful = 0u32;
    let mut rows = Vec::with_capacity(count as usize);

    for attempt in 1..=count {
        let started = Instant::now();
        let outcome = match TcpStream::connect_timeout(&target, timeout) {
            Ok(_) => {
                successful += 1;
                let ms = started.elapsed().as_secs_f64() * 1000.0;
                format!("{} reachable ({ms:.2} ms)", "✓".green())
            }
            Err(e) => format!("{} {e}", "✗".red()),
        };
        rows.push(vec![format!("{attempt}/{count}"), outcome]);
    }

    let rate = successful as f64 / count as f64 * 100.0;
    Ok(Report::Multi(vec![
        Report::table(
            format!("Ping results for {host} ({address})"),
            vec!["Attempt", "Result"],
            rows,
        ),
        Report::text(format!("Success rate: {successful}/{count} ({rate:.1}%)")),
    ]))
}

/// Resolve a hostname to its first address.
fn resolve(host: &str) -> Result<IpAddr, HandlerError> {
    (host, 0u16)
        .to_socket_addrs()
        .map_err(|_| HandlerError::Network(format!("could not resolve hostname: {host}")))?
        .next()
        .map(|addr| addr.ip())
        .ok_or_else(|| HandlerError::Network(format!("could not resolve hostname: {host}")))
}

/// Prepend https:// when no scheme is given.
fn normalize_url(url: &str) -> String {
    if url.starts_with("http://") || url.starts_with("https://") {
        url.to_string()
    } else {
        format!("https://{url}")
    }
}

/// Best-effort service names for common ports; no /etc/services lookup.
fn well_known_service(port: u16) -> &'static str {
    match port {
        21 => "ftp",
        22 => "ssh",
        23 => "telnet",
        25 => "smtp",
        53 => "dns",
        80 => "http",
        110 => "pop3",
        143 => "imap",
        443 => "https",
        587 => "submission",
        993 => "imaps",
        995 => "pop3s",
        3306 => "mysql",
        5432 => "postgresql",
        6379 => "redis",
        8080 => "http-alt",
        _ => "unknown",
    }
}
