use std::io;
use std::sync::OnceLock;
use std::time::{Duration, Instant};

use crate::pal::Platform;

/// Singleton instance of `BuildTargetPlatform`, used by public API types
/// to hook up to the real operating system probes.
pub(crate) static BUILD_TARGET_PLATFORM: BuildTargetPlatform = BuildTargetPlatform;

/// All clock readings are offsets from the first reading taken in the process.
static CLOCK_ORIGIN: OnceLock<Instant> = OnceLock::new();

/// The platform that the build is targeting.
///
/// You would only use different platforms in unit tests that need to control time and memory.
#[derive(Debug)]
pub(crate) struct BuildTargetPlatform;

// Real probes are excluded from coverage measurement because they are exercised by the
// integration tests against the actual operating system.
#[cfg_attr(coverage_nightly, coverage(off))]
impl Platform for BuildTargetPlatform {
    fn now(&self) -> Duration {
        CLOCK_ORIGIN.get_or_init(Instant::now).elapsed()
    }

    #[cfg(target_os = "linux")]
    fn memory_usage_bytes(&self) -> io::Result<u64> {
        let statm = std::fs::read_to_string("/proc/self/statm")?;
        let resident_pages = parse_statm_resident_pages(&statm)?;

        resident_pages.checked_mul(page_size()?).ok_or_else(|| {
            io::Error::new(io::ErrorKind::InvalidData, "resident set size overflows u64")
        })
    }

    // Outside Linux there is no cheap way to query the current resident set size, so we fall
    // back to the high water mark, which is what `getrusage()` reports.
    #[cfg(all(unix, not(target_os = "linux")))]
    fn memory_usage_bytes(&self) -> io::Result<u64> {
        // SAFETY: All-zero is a valid initial value for this type.
        let mut usage: libc::rusage = unsafe { std::mem::zeroed() };

        // SAFETY: We are passing valid arguments, no other safety requirements.
        let result = unsafe { libc::getrusage(libc::RUSAGE_SELF, &raw mut usage) };

        if result != 0 {
            return Err(io::Error::last_os_error());
        }

        let max_rss = u64::try_from(usage.ru_maxrss)
            .map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))?;

        // Apple platforms report bytes, the BSDs report kilobytes.
        if cfg!(any(target_os = "macos", target_os = "ios")) {
            Ok(max_rss)
        } else {
            Ok(max_rss.saturating_mul(1024))
        }
    }

    #[cfg(not(unix))]
    fn memory_usage_bytes(&self) -> io::Result<u64> {
        Err(io::Error::new(
            io::ErrorKind::Unsupported,
            "process memory sampling is not supported on this platform",
        ))
    }

    #[cfg(target_os = "linux")]
    fn system_memory_percent(&self) -> io::Result<f64> {
        let meminfo = std::fs::read_to_string("/proc/meminfo")?;
        parse_meminfo_used_percent(&meminfo)
    }

    #[cfg(not(target_os = "linux"))]
    fn system_memory_percent(&self) -> io::Result<f64> {
        Err(io::Error::new(
            io::ErrorKind::Unsupported,
            "system memory sampling is not supported on this platform",
        ))
    }
}

/// Extracts the resident page count, the second field of `/proc/self/statm`.
#[cfg(target_os = "linux")]
fn parse_statm_resident_pages(statm: &str) -> io::Result<u64> {
    let field = statm.split_whitespace().nth(1).ok_or_else(|| {
        io::Error::new(
            io::ErrorKind::InvalidData,
            format!("/proc/self/statm has no resident field: '{statm}'"),
        )
    })?;

    field
        .parse()
        .map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))
}

/// Memory in use is everything that is not available: `MemTotal` minus `MemAvailable`.
#[cfg(target_os = "linux")]
#[expect(
    clippy::cast_precision_loss,
    reason = "a percentage does not need more than 52 bits of kilobytes"
)]
fn parse_meminfo_used_percent(meminfo: &str) -> io::Result<f64> {
    let field = |name: &str| -> io::Result<u64> {
        meminfo
            .lines()
            .find_map(|line| line.strip_prefix(name)?.strip_prefix(':'))
            .and_then(|rest| rest.split_whitespace().next())
            .ok_or_else(|| {
                io::Error::new(
                    io::ErrorKind::InvalidData,
                    format!("/proc/meminfo has no {name} field"),
                )
            })?
            .parse()
            .map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))
    };

    let total = field("MemTotal")?;
    let available = field("MemAvailable")?;

    if total == 0 {
        return Err(io::Error::new(
            io::ErrorKind::InvalidData,
            "/proc/meminfo reports zero total memory",
        ));
    }

    let used = total.saturating_sub(available);
    Ok(used as f64 / total as f64 * 100.0)
}

#[cfg(target_os = "linux")]
fn page_size() -> io::Result<u64> {
    // SAFETY: No safety requirements, the call only reads a configuration value.
    let page_size = unsafe { libc::sysconf(libc::_SC_PAGESIZE) };

    if page_size <= 0 {
        return Err(io::Error::last_os_error());
    }

    u64::try_from(page_size).map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))
}
