use std::fmt;

/// Kind of media a local input file holds, detected from its extension.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum MediaKind {
    Image,
    Video,
    Audio,
    Mesh,
}

const IMAGE_EXTS: &[&str] = &[
    "jpg", "jpeg", "png", "webp", "gif", "bmp", "tif", "tiff", "heic", "heif", "ico", "svg",
    "avif", "psd", "exr", "jp2", "jfi", "jif", "jfif", "jpe",
];
const VIDEO_EXTS: &[&str] = &[
    "mp4", "mov", "mkv", "avi", "webm", "m4v", "mpeg", "mpg", "ts", "3gp", "3g2", "ogv", "flv",
];
const AUDIO_EXTS: &[&str] = &["mp3", "m4a", "aac", "opus", "ogg", "wav", "flac"];
const MESH_EXTS: &[&str] = &[
    "stl", "obj", "glb", "gltf", "fbx", "ply", "3ds", "dae", "off", "x", "3mf", "plyb",
];

const IMAGE_TARGETS: &[&str] = &[
    "jpg", "png", "webp", "avif", "gif", "bmp", "tiff", "ico", "svg", "heic", "heif", "psd",
    "exr", "jp2",
];
const VIDEO_TARGETS: &[&str] = &[
    "mp4", "webm", "mkv", "mov", "avi", "m4v", "mpeg", "mpg", "ts", "3gp", "3g2", "ogv", "flv",
    "gif",
];
const MESH_TARGETS: &[&str] = &[
    "glb", "gltf", "obj", "stl", "ply", "plyb", "fbx", "3mf", "3ds", "dae", "x", "off",
];

impl MediaKind {
    pub const ALL: [MediaKind; 4] = [
        MediaKind::Image,
        MediaKind::Video,
        MediaKind::Audio,
        MediaKind::Mesh,
    ];

    /// Classifies a bare extension (without the dot), case-insensitively.
    pub fn from_extension(ext: &str) -> Option<Self> {
        let ext = ext.to_ascii_lowercase();
        Self::ALL
            .into_iter()
            .find(|kind| kind.extensions().contains(&ext.as_str()))
    }

    /// Classifies a file name by its final extension.
    pub fn detect(file_name: &str) -> Option<Self> {
        Self::from_extension(&extension_of(file_name))
    }

    pub fn extensions(self) -> &'static [&'static str] {
        match self {
            MediaKind::Image => IMAGE_EXTS,
            MediaKind::Video => VIDEO_EXTS,
            MediaKind::Audio => AUDIO_EXTS,
            MediaKind::Mesh => MESH_EXTS,
        }
    }

    /// Output formats the backend can produce for this kind.
    ///
    /// Audio has no conversion targets.
    pub fn targets(self) -> &'static [&'static str] {
        match self {
            MediaKind::Image => IMAGE_TARGETS,
            MediaKind::Video => VIDEO_TARGETS,
            MediaKind::Audio => &[],
            MediaKind::Mesh => MESH_TARGETS,
        }
    }

    pub fn allows(self, target: &TargetFormat) -> bool {
        self.targets().contains(&target.as_str())
    }

    /// Form value sent to the backend.
    pub fn as_str(self) -> &'static str {
        match self {
            MediaKind::Image => "image",
            MediaKind::Video => "video",
            MediaKind::Audio => "audio",
            MediaKind::Mesh => "mesh",
        }
    }
}

impl fmt::Display for MediaKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Lower-cased extension of the final path component, or an empty string.
pub fn extension_of(name: &str) -> String {
    let last = name.rsplit(['/', '\\']).next().unwrap_or(name);
    match last.rsplit_once('.') {
        Some((_, ext)) => ext.to_ascii_lowercase(),
        None => String::new(),
    }
}

/// A normalized (trimmed, lower-cased, dot-less) output format token.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct TargetFormat(String);

impl TargetFormat {
    /// Returns `None` for blank input.
    pub fn parse(raw: &str) -> Option<Self> {
        let token = raw.trim().trim_start_matches('.').to_ascii_lowercase();
        if token.is_empty() {
            None
        } else {
            Some(Self(token))
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for TargetFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// What a remote-media fetch should extract.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FetchKind {
    Video,
    Audio,
}

const VIDEO_QUALITIES: &[&str] = &["best", "1080p", "720p", "480p", "360p"];
const AUDIO_QUALITIES: &[&str] = &["best", "256k", "128k"];

impl FetchKind {
    pub const DEFAULT_QUALITY: &'static str = "best";

    pub fn parse(raw: &str) -> Option<Self> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "video" => Some(FetchKind::Video),
            "audio" => Some(FetchKind::Audio),
            _ => None,
        }
    }

    pub fn qualities(self) -> &'static [&'static str] {
        match self {
            FetchKind::Video => VIDEO_QUALITIES,
            FetchKind::Audio => AUDIO_QUALITIES,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            FetchKind::Video => "video",
            FetchKind::Audio => "audio",
        }
    }
}

impl fmt::Display for FetchKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
