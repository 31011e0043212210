//! System monitoring commands (sysinfo-backed)

use std::path::Path;
use std::thread;
use std::time::Duration;

use colored::Colorize;
use sysinfo::{Disks, System};
use tracing::debug;

use super::{human_size, HandlerError, HandlerResult};
use crate::cli::args::ProcessSort;
use crate::cli::report::Report;

/// Sample CPU usage `count` times, `interval` seconds apart.
pub fn cpu(interval: u64, count: u32) -> HandlerResult {
    debug!(interval, count, "sampling cpu");

    let mut sys = System::new();
    sys.refresh_cpu_usage();

    // usage is computed as a delta, so every reading needs a prior refresh
    let pause = Duration::from_secs(interval).max(sysinfo::MINIMUM_CPU_UPDATE_INTERVAL);

    let mut rows = Vec::with_capacity(count as usize);
    for i in 0..count {
        thread::sleep(pause);
        sys.refresh_cpu_usage();

        let per_core = sys
            .cpus()
            .iter()
            .map(|c| format!("{:.1}%", c.cpu_usage()))
            .collect::<Vec<_>>()
            .join(", ");

        rows.push(vec![
            format!("{}/{}", i + 1, count),
            format!("{:.1}%", sys.global_cpu_usage()),
            per_core,
        ]);
    }

    let physical = sys
        .physical_core_count()
        .map(|n| n.to_string())
        .unwrap_or_else(|| "?".into());
    let summary = format!(
        "Total CPU cores: {} logical, {} physical",
        sys.cpus().len(),
        physical
    );

    Ok(Report::Multi(vec![
        Report::table("CPU usage", vec!["Reading", "Total", "Per core"], rows),
        Report::text(summary),
    ]))
}

/// RAM and swap usage with a health note.
pub fn memory() -> HandlerResult {
    let mut sys = System::new();
    sys.refresh_memory();

    let total = sys.total_memory();
    let used = sys.used_memory();
    let available = sys.available_memory();
    let swap_total = sys.total_swap();
    let swap_used = sys.used_swap();

    let used_pct = percent(used, total);
    let swap_pct = percent(swap_used, swap_total);

    let pairs = vec![
        ("Total RAM".to_string(), human_size(total)),
        (
            "Available RAM".to_string(),
            format!("{} ({:.1}%)", human_size(available), percent(available, total)),
        ),
        (
            "Used RAM".to_string(),
            format!("{} ({:.1}%)", human_size(used), used_pct),
        ),
        ("Total swap".to_string(), human_size(swap_total)),
        (
            "Used swap".to_string(),
            format!("{} ({:.1}%)", human_size(swap_used), swap_pct),
        ),
    ];

    let note = if used_pct > 80.0 {
        format!("{} High memory usage detected", "⚠".red())
    } else if used_pct > 60.0 {
        format!("{} Moderate memory usage", "⚠".yellow())
    } else {
        format!("{} Memory usage is healthy", "✓".green())
    };

    Ok(Report::Multi(vec![
        Report::KeyValue {
            title: "Memory usage".into(),
            pairs,
        },
        Report::text(note),
    ]))
}

/// Top processes by the chosen sort key.
pub fn processes(limit: usize, sort_by: ProcessSort) -> HandlerResult {
    debug!(limit, ?sort_by, "listing processes");

    let mut sys = System::new_all();
    // second refresh so per-process cpu usage has a delta to work from
    thread::sleep(sysinfo::MINIMUM_CPU_UPDATE_INTERVAL);
    sys.refresh_all();

    let total_memory = sys.total_memory();
    let mut entries: Vec<(u32, String, f32, f64)> = sys
        .processes()
        .values()
        .map(|p| {
            (
                p.pid().as_u32(),
                p.name().to_string_lossy().into_owned(),
                p.cpu_usage(),
                percent(p.memory(), total_memory),
            )
        })
        .collect();

    match sort_by {
        ProcessSort::Memory => {
            entries.sort_by(|a, b| b.3.partial_cmp(&a.3).unwrap_or(std::cmp::Ordering::Equal))
        }
        ProcessSort::Cpu => {
            entries.sort_by(|a, b| b.2.partial_cmp(&a.2).unwrap_or(std::cmp::Ordering::Equal))
        }
        ProcessSort::Name => entries.sort_by(|a, b| a.1.to_lowercase().cmp(&b.1.to_lowercase())),
    }

    let sort_label = match sort_by {
        ProcessSort::Memory => "memory",
        ProcessSort::Cpu => "cpu",
        ProcessSort::Name => "name",
    };

    let total = entries.len();
    let rows = entries
        .into_iter()
        .take(limit)
        .map(|(pid, name, cpu, mem)| {
            vec![
                pid.to_string(),
                name.chars().take(30).collect(),
                format!("{:.1}%", cpu),
                format!("{:.2}%", mem),
            ]
        })
        .collect();

    Ok(Report::Multi(vec![
        Report::table(
            format!("Top {limit} processes (sorted by {sort_label})"),
            vec!["PID", "Name", "CPU %", "Memory %"],
            rows,
        ),
        Report::text(format!("Total processes running: {total}")),
    ]))
}

/// Per-partition usage; an extra panel for `path` when it is not itself a
/// mount point.
pub fn disk(path: &Path) -> HandlerResult {
    let disks = Disks::new_with_refreshed_list();

    let mut rows = Vec::new();
    for disk in disks.list() {
        let total = disk.total_space();
        let free = disk.available_space();
        let used = total.saturating_sub(free);
        rows.push(vec![
            disk.name().to_string_lossy().into_owned(),
            disk.mount_point().display().to_string(),
            disk.file_system().to_string_lossy().into_owned(),
            human_size(total),
            human_size(used),
            human_size(free),
            format!("{:.1}%", percent(used, total)),
        ]);
    }

    let table = Report::table(
        "Disk usage",
        vec!["Device", "Mount point", "File system", "Total", "Used", "Free", "Usage %"],
        rows,
    );

    let resolved = path
        .canonicalize()
        .map_err(|_| HandlerError::NotFound(format!("path not found: {}", path.display())))?;

    let is_mount_point = disks.list().iter().any(|d| d.mount_point() == resolved);
    if is_mount_point {
        return Ok(table);
    }

    // best-match partition: longest mount point that prefixes the path
    let holder = disks
        .list()
        .iter()
        .filter(|d| resolved.starts_with(d.mount_point()))
        .max_by_key(|d| d.mount_point().as_os_str().len());

    let Some(disk) = holder else {
        return Ok(table);
    };

    let total = disk.total_space();
    let free = disk.available_space();
    let used = total.saturating_sub(free);
    let panel = Report::key_value(
        "Path usage",
        vec![
            ("Path", resolved.display().to_string()),
            ("Partition", disk.mount_point().display().to_string()),
            ("Total", human_size(total)),
            ("Used", human_size(used)),
            ("Free", human_size(free)),
            ("Usage", format!("{:.1}%", percent(used, total))),
        ],
    );

    Ok(Report::Multi(vec![table, panel]))
}

/// Host facts for the top-level `info` command.
pub fn host_summary() -> Vec<(String, String)> {
    let unknown = || "unknown".to_string();
    vec![
        (
            "Host".to_string(),
            System::host_name().unwrap_or_else(unknown),
        ),
        (
            "OS".to_string(),
            format!(
                "{} {}",
                System::name().unwrap_or_else(unknown),
                System::os_version().unwrap_or_default()
            )
            .trim()
            .to_string(),
        ),
        (
            "Kernel".to_string(),
            System::kernel_version().unwrap_or_else(unknown),
        ),
        ("Uptime".to_string(), format_uptime(System::uptime())),
    ]
}

fn percent(part: u64, whole: u64) -> f64 {
    if whole == 0 {
        0.0
    } else {
        part as f64 / whole as f64 * 100.0
    }
}

fn format_uptime(secs: u64) -> String {
    let days = secs / 86_400;
    let hours = (secs % 86_400) / 3_600;
    let minutes = (secs % 3_600) / 60;
    if days > 0 {
        format!("{days}d {hours}h {minutes}m")
    } else if hours > 0 {
        format!("{hours}h {minutes}m")
    } else {
        format!("{minutes}m")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn given_zero_whole_when_computing_percent_then_returns_zero() {
        assert_eq!(percent(10, 0), 0.0);
    }

    #[test]
    fn given_half_when_computing_percent_then_returns_fifty() {
        assert!((percent(50, 100) - 50.0).abs() < f64::EPSILON);
    }

    #[test]
    fn given_seconds_when_formatting_uptime_then_largest_unit_leads() {
        assert_eq!(format_uptime(59), "0m");
        assert_eq!(format_uptime(3_661), "1h 1m");
        assert_eq!(format_uptime(90_061), "1d 1h 1m");
    }

    #[test]
    fn given_host_summary_then_contains_expected_keys() {
        let keys: Vec<String> = host_summary().into_iter().map(|(k, _)| k).collect();
        assert_eq!(keys, vec!["Host", "OS", "Kernel", "Uptime"]);
    }
}
