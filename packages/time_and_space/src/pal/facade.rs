use std::fmt::{self, Debug};
use std::io;
#[cfg(test)]
use std::sync::Arc;
use std::time::Duration;

use crate::pal::real::BuildTargetPlatform;
#[cfg(test)]
use crate::pal::{FakePlatform, MockPlatform};
use crate::pal::{BUILD_TARGET_PLATFORM, Platform};
use crate::{BYTES_PER_GIGABYTE, Error, Result};

/// Dispatches to the real platform or, in unit tests, to a fake or mock one.
#[derive(Clone)]
pub(crate) enum PlatformFacade {
    Real(&'static BuildTargetPlatform),

    #[cfg(test)]
    Fake(FakePlatform),

    #[cfg(test)]
    Mock(Arc<MockPlatform>),
}

impl PlatformFacade {
    pub(crate) fn real() -> Self {
        Self::Real(&BUILD_TARGET_PLATFORM)
    }

    #[cfg(test)]
    pub(crate) fn fake(platform: FakePlatform) -> Self {
        Self::Fake(platform)
    }

    #[cfg(test)]
    pub(crate) fn from_mock(mock: MockPlatform) -> Self {
        Self::Mock(Arc::new(mock))
    }

    /// Samples the resident memory of the current process, converted to gigabytes.
    ///
    /// The probe reports bytes; this is the only place where bytes become gigabytes.
    #[expect(
        clippy::cast_precision_loss,
        reason = "sub-byte precision is irrelevant for memory figures reported in gigabytes"
    )]
    pub(crate) fn memory_gigabytes(&self) -> Result<f64> {
        let bytes = self
            .memory_usage_bytes()
            .map_err(|source| Error::MemoryProbe { source })?;

        Ok(bytes as f64 / BYTES_PER_GIGABYTE)
    }
}

impl Platform for PlatformFacade {
    fn now(&self) -> Duration {
        match self {
            Self::Real(p) => p.now(),
            #[cfg(test)]
            Self::Fake(p) => p.now(),
            #[cfg(test)]
            Self::Mock(p) => p.now(),
        }
    }

    fn memory_usage_bytes(&self) -> io::Result<u64> {
        match self {
            Self::Real(p) => p.memory_usage_bytes(),
            #[cfg(test)]
            Self::Fake(p) => p.memory_usage_bytes(),
            #[cfg(test)]
            Self::Mock(p) => p.memory_usage_bytes(),
        }
    }

    fn system_memory_percent(&self) -> io::Result<f64> {
        match self {
            Self::Real(p) => p.system_memory_percent(),
            #[cfg(test)]
            Self::Fake(p) => p.system_memory_percent(),
            #[cfg(test)]
            Self::Mock(p) => p.system_memory_percent(),
        }
    }
}

impl Debug for PlatformFacade {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Real(p) => p.fmt(f),
            #[cfg(test)]
            Self::Fake(p) => p.fmt(f),
            #[cfg(test)]
            Self::Mock(p) => p.fmt(f),
        }
    }
}

#[cfg(test)]
#[cfg_attr(coverage_nightly, coverage(off))]
mod tests {
    use super::*;

    #[test]
    fn converts_bytes_to_gigabytes() {
        let fake = FakePlatform::new();
        fake.set_memory_bytes(3 * 1024 * 1024 * 1024 / 2);
        let facade = PlatformFacade::fake(fake);

        let gigabytes = facade.memory_gigabytes().unwrap();
        assert!((gigabytes - 1.5).abs() < 1e-12, "got {gigabytes}");
    }

    #[test]
    fn one_gigabyte_is_1024_cubed_bytes() {
        let fake = FakePlatform::new();
        fake.set_memory_bytes(1_073_741_824);
        let facade = PlatformFacade::fake(fake);

        let gigabytes = facade.memory_gigabytes().unwrap();
        assert!((gigabytes - 1.0).abs() < 1e-12, "got {gigabytes}");
    }

    #[test]
    fn probe_failure_becomes_memory_probe_error() {
        let mut mock = MockPlatform::new();
        mock.expect_memory_usage_bytes()
            .times(1)
            .returning(|| Err(io::Error::new(io::ErrorKind::Unsupported, "no probe")));
        let facade = PlatformFacade::from_mock(mock);

        let error = facade.memory_gigabytes().unwrap_err();
        assert!(matches!(error, Error::MemoryProbe { .. }));
    }

    #[test]
    fn delegates_clock_to_inner_platform() {
        let fake = FakePlatform::new();
        fake.set_now(Duration::from_secs(42));
        let facade = PlatformFacade::fake(fake);

        assert_eq!(facade.now(), Duration::from_secs(42));
    }

    #[test]
    fn delegates_system_memory_to_inner_platform() {
        let mut mock = MockPlatform::new();
        mock.expect_system_memory_percent()
            .times(1)
            .returning(|| Ok(63.0));
        let facade = PlatformFacade::from_mock(mock);

        assert_eq!(facade.system_memory_percent().unwrap(), 63.0);
    }
}
