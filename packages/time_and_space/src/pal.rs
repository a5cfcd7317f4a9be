//! Platform abstraction layer for clock and memory sampling.
//!
//! This module provides a platform abstraction that allows switching between the real
//! operating system probes and fake or mock implementations for testing purposes.

mod abstractions;
mod facade;
#[cfg(test)]
mod fake;
mod real;

pub(crate) use abstractions::Platform;
#[cfg(test)]
pub(crate) use abstractions::MockPlatform;
pub(crate) use facade::PlatformFacade;
#[cfg(test)]
pub(crate) use fake::FakePlatform;
pub(crate) use real::BUILD_TARGET_PLATFORM;
