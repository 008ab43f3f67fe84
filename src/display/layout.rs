use crate::types::{FontSize, Orientation};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScreenClass {
    Mobile,
    Tablet,
    Desktop,
    Tv,
}

impl ScreenClass {
    pub fn from_width(width_px: u32) -> Self {
        match width_px {
            0..=767 => ScreenClass::Mobile,
            768..=1023 => ScreenClass::Tablet,
            1024..=1919 => ScreenClass::Desktop,
            _ => ScreenClass::Tv,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LayoutParams {
    pub screen: ScreenClass,
    pub font: FontSize,
    /// 1 or 2
    pub columns: u8,
    pub banner_height: i64,
}

/// Presentation parameters for a viewport. Pure; call again on every resize.
pub fn derive(width_px: u32, orientation: Orientation, font_setting: FontSize, banner_height: i64) -> LayoutParams {
    let screen = ScreenClass::from_width(width_px);
    let font = match screen {
        ScreenClass::Mobile => FontSize::Xl,
        ScreenClass::Tablet => FontSize::Xl3,
        ScreenClass::Desktop => font_setting,
        ScreenClass::Tv => FontSize::Xl6,
    };
    let columns = if screen == ScreenClass::Mobile || orientation == Orientation::Vertical { 1 } else { 2 };
    let banner_height = if screen == ScreenClass::Mobile {
        (banner_height as f64 * 0.6).round() as i64
    } else {
        banner_height
    };

    LayoutParams { screen, font, columns, banner_height }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn screen_class_boundaries() {
        assert_eq!(ScreenClass::from_width(767), ScreenClass::Mobile);
        assert_eq!(ScreenClass::from_width(768), ScreenClass::Tablet);
        assert_eq!(ScreenClass::from_width(1023), ScreenClass::Tablet);
        assert_eq!(ScreenClass::from_width(1024), ScreenClass::Desktop);
        assert_eq!(ScreenClass::from_width(1919), ScreenClass::Desktop);
        assert_eq!(ScreenClass::from_width(1920), ScreenClass::Tv);
    }

    #[test]
    fn font_tier_overrides_setting_except_on_desktop() {
        let pick = |w| derive(w, Orientation::Horizontal, FontSize::Xl2, 120).font;
        assert_eq!(pick(400), FontSize::Xl);
        assert_eq!(pick(900), FontSize::Xl3);
        assert_eq!(pick(1280), FontSize::Xl2);
        assert_eq!(pick(3840), FontSize::Xl6);
    }

    #[test]
    fn single_column_on_mobile_or_vertical() {
        assert_eq!(derive(400, Orientation::Horizontal, FontSize::Xl4, 120).columns, 1);
        assert_eq!(derive(1920, Orientation::Vertical, FontSize::Xl4, 120).columns, 1);
        assert_eq!(derive(1920, Orientation::Horizontal, FontSize::Xl4, 120).columns, 2);
    }

    #[test]
    fn banner_shrinks_on_mobile_only() {
        assert_eq!(derive(400, Orientation::Horizontal, FontSize::Xl4, 120).banner_height, 72);
        assert_eq!(derive(1000, Orientation::Horizontal, FontSize::Xl4, 120).banner_height, 120);
    }

    #[test]
    fn same_inputs_same_outputs() {
        let a = derive(1366, Orientation::Vertical, FontSize::Xl5, 90);
        let b = derive(1366, Orientation::Vertical, FontSize::Xl5, 90);
        assert_eq!(a, b);
    }
}
