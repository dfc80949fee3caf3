//! Platform constants shared by the normalizer and the retry loop.

/// Maximum emote payload the platform accepts, in bytes (256 KiB).
pub const MAX_EMOTE_BYTES: u64 = 262_144;

/// Bounding box an emote must fit within under the default size-fit policy.
pub const MAX_EMOTE_DIMENSIONS: (u32, u32) = (256, 256);

/// Minimum supported footprint used by the manual-resize fallback after
/// every candidate variant has been size-rejected.
pub const FALLBACK_EMOTE_DIMENSIONS: (u32, u32) = (128, 128);

/// Connect timeout for all outbound requests, in seconds.
pub const CONNECT_TIMEOUT_SECS: u64 = 10;

/// Read timeout for all outbound requests, in seconds.
///
/// Emote assets are small (the ceiling is 256 KiB), so a short read
/// timeout is enough; a stalled transfer is treated as a transport error.
pub const READ_TIMEOUT_SECS: u64 = 30;

/// Default base URL of the 7TV emote metadata API.
pub const SEVENTV_API_BASE: &str = "https://7tv.io/v3/emotes";

/// Default base URL of the guild emote create-resource API.
pub const DISCORD_API_BASE: &str = "https://discord.com/api/v10";
