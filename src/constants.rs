//! Global constants for the vision pack

/// Host interface type the image widgets are registered for.
pub const IMAGE_INTERFACE_TYPE: &str = "ITcVnImage";

/// Widget category used when registering with the host.
pub const WIDGET_CATEGORY: &str = "INTERFACE";

/// Literal node type that receives dropped image files.
pub const IMAGE_LITERAL_NODE: &str = "Literal/ITcVnImage";

/// Property of the literal node that holds the payload.
pub const IMAGE_VALUE_PROPERTY: &str = "value";

/// File extensions associated with the image literal node.
pub const IMAGE_FILE_EXTENSIONS: [&str; 5] = ["jpg", "png", "bmp", "tiff", "tif"];

/// Pixel encoding written into payloads produced by this pack.
pub const PIXEL_ENCODING_NONE: &str = "TCVN_PE_NONE";

/// Pixel pack mode written into payloads produced by this pack.
pub const PIXEL_PACK_MODE_NONE: &str = "TCVN_PPM_NONE";

/// Name of the background decode thread.
pub const DECODER_THREAD_NAME: &str = "vision-decoder";

/// Number of text lines in the meta box under the image.
pub const META_LINE_COUNT: usize = 2;
