//! Mock dynamic path handler.

use std::sync::Arc;

use ember_glow::{GlowCommand, GlowParameter, Path};
use mockall::mock;

use crate::dynamic::DynamicPathHandler;
use crate::session::Session;

mock! {
    pub(crate) PathHandler {}
    impl DynamicPathHandler for PathHandler {
        fn handle_command(&self, command: &GlowCommand, path: &Path, session: &Arc<Session>);
        fn handle_parameter(&self, parameter: &GlowParameter, path: &Path, session: &Arc<Session>);
    }
}
