//! System introspection

/// Runtime information about the microcontroller
pub trait SystemInfo {
    /// Bytes of free RAM between heap and stack
    fn free_memory(&self) -> u32;

    /// Milliseconds since boot, wrapping at `u32::MAX`
    fn uptime_ms(&self) -> u32;
}
