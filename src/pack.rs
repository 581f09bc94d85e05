//! Pack installation into a host graph framework.

use std::sync::Arc;

use vision_canvas::KindRegistry;

use crate::config::PackConfig;
use crate::constants::{IMAGE_FILE_EXTENSIONS, IMAGE_INTERFACE_TYPE, IMAGE_LITERAL_NODE, IMAGE_VALUE_PROPERTY, WIDGET_CATEGORY};
use crate::host::WidgetRole;
use crate::widget::{ImageControlWidget, ImageDisplayWidget};

/// Registration API of the host framework, called once at install time.
pub trait PackRegistrar {
    fn register_widget_type(&mut self, role: WidgetRole, category: &str, type_name: &str);

    /// Route dropped files with one of `extensions` to `property` of a new
    /// `node_type` node.
    fn register_file_association(&mut self, extensions: &[&str], node_type: &str, property: &str);
}

/// The vision pack: widget factories sharing one configuration and kind
/// registry.
#[derive(Debug, Clone)]
pub struct VisionPack {
    config: PackConfig,
    registry: Arc<KindRegistry>,
}

impl VisionPack {
    /// Pack with the built-in annotation kinds.
    pub fn new(config: PackConfig) -> Self {
        Self::with_registry(config, KindRegistry::new())
    }

    pub fn with_registry(config: PackConfig, registry: KindRegistry) -> Self {
        Self {
            config,
            registry: Arc::new(registry),
        }
    }

    pub fn config(&self) -> &PackConfig {
        &self.config
    }

    pub fn registry(&self) -> &KindRegistry {
        &self.registry
    }

    /// Register both widget roles and the image file association.
    pub fn install(&self, registrar: &mut impl PackRegistrar) {
        for role in [WidgetRole::Control, WidgetRole::Display] {
            registrar.register_widget_type(role, WIDGET_CATEGORY, IMAGE_INTERFACE_TYPE);
        }
        registrar.register_file_association(&IMAGE_FILE_EXTENSIONS, IMAGE_LITERAL_NODE, IMAGE_VALUE_PROPERTY);
        log::info!(
            "Vision pack installed ({} annotation kinds)",
            self.registry.len()
        );
    }

    pub fn create_display_widget(&self, name: impl Into<String>) -> ImageDisplayWidget {
        ImageDisplayWidget::new(name, &self.config.display, Arc::clone(&self.registry))
    }

    pub fn create_control_widget(&self, name: impl Into<String>) -> ImageControlWidget {
        ImageControlWidget::new(name, &self.config, Arc::clone(&self.registry))
    }
}

impl Default for VisionPack {
    fn default() -> Self {
        Self::new(PackConfig::default())
    }
}
