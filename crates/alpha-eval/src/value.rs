pub use alpha_common::{CrossSection, FieldBundle, Panel, PanelValue, ScalarValue};
