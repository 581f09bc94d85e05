//! Meta text shown under the image.

use crate::constants::META_LINE_COUNT;
use crate::payload::ImageInfo;

/// Channel labels for a pixel with `count` values.
fn channel_labels(count: usize) -> Vec<String> {
    let named: &[&str] = match count {
        1 => &["L"],
        2 => &["L", "A"],
        3 => &["R", "G", "B"],
        4 => &["R", "G", "B", "A"],
        _ => &[],
    };
    (0..count)
        .map(|i| named.get(i).map_or_else(|| format!("Ch{}", i + 1), |s| (*s).to_string()))
        .collect()
}

/// Round to an integer and right-align in three columns.
fn pad3(value: f64) -> String {
    format!("{:>3}", format!("{:.0}", value))
}

/// `"{w} x {h} px  {c} ch  {bits} bit"`
pub fn info_line(info: &ImageInfo) -> String {
    format!(
        "{} x {} px  {} ch  {} bit",
        info.width, info.height, info.pixel_format.channels, info.pixel_format.element_size
    )
}

/// Hover position followed by the labelled channel values, if any.
pub fn pixel_line(img_x: f32, img_y: f32, values: Option<&[f64]>) -> String {
    let mut line = format!("+ {}, {}", pad3(f64::from(img_x)), pad3(f64::from(img_y)));
    if let Some(values) = values {
        let labelled: Vec<String> = channel_labels(values.len())
            .into_iter()
            .zip(values)
            .map(|(label, v)| format!("{}{}", label, pad3(*v)))
            .collect();
        line.push(' ');
        line.push_str(&labelled.join(" "));
    }
    line
}

/// Both meta lines; the second is blank when nothing is hovered.
pub fn meta_lines(info: &ImageInfo, hover: Option<(f32, f32, Option<Vec<f64>>)>) -> [String; META_LINE_COUNT] {
    let second = match hover {
        Some((x, y, values)) => pixel_line(x, y, values.as_deref()),
        None => "  ".to_string(),
    };
    [info_line(info), second]
}
