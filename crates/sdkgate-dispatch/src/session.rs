//! Per-session state referenced by the dispatcher.

use std::sync::atomic::{AtomicBool, Ordering};

use parking_lot::RwLock;
use sdkgate_core::SessionId;

/// Backing modules that must be initialised before gated operations run.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ResourceModule {
    /// Friend relations.
    Friend,
    /// User profile.
    User,
    /// Groups.
    Group,
    /// Conversations and messages.
    Conversation,
    /// Full-sync of user/group data.
    Full,
}

impl ResourceModule {
    /// All modules, in check order.
    pub const ALL: [Self; 5] = [
        Self::Friend,
        Self::User,
        Self::Group,
        Self::Conversation,
        Self::Full,
    ];

    /// Module name for diagnostics.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Friend => "friend",
            Self::User => "user",
            Self::Group => "group",
            Self::Conversation => "conversation",
            Self::Full => "full",
        }
    }
}

/// Readiness flag bundle. Loaded only when every module is loaded.
#[derive(Debug, Default)]
pub struct Readiness {
    flags: [AtomicBool; 5],
}

impl Readiness {
    fn slot(module: ResourceModule) -> usize {
        match module {
            ResourceModule::Friend => 0,
            ResourceModule::User => 1,
            ResourceModule::Group => 2,
            ResourceModule::Conversation => 3,
            ResourceModule::Full => 4,
        }
    }

    /// Set one module's flag.
    pub fn set_loaded(&self, module: ResourceModule, loaded: bool) {
        self.flags[Self::slot(module)].store(loaded, Ordering::Release);
    }

    /// Whether one module is loaded.
    pub fn is_module_loaded(&self, module: ResourceModule) -> bool {
        self.flags[Self::slot(module)].load(Ordering::Acquire)
    }

    /// Whether every module is loaded.
    pub fn is_loaded(&self) -> bool {
        ResourceModule::ALL
            .iter()
            .all(|m| self.is_module_loaded(*m))
    }

    /// Modules not yet loaded.
    pub fn missing(&self) -> Vec<ResourceModule> {
        ResourceModule::ALL
            .into_iter()
            .filter(|m| !self.is_module_loaded(*m))
            .collect()
    }

    /// Mark every module loaded.
    pub fn mark_all_loaded(&self) {
        for m in ResourceModule::ALL {
            self.set_loaded(m, true);
        }
    }

    /// Clear every flag.
    pub fn reset(&self) {
        for m in ResourceModule::ALL {
            self.set_loaded(m, false);
        }
    }
}

/// State for one connected client.
///
/// Owned by the transport; the dispatcher holds shared references.
#[derive(Debug)]
pub struct SessionState {
    id: SessionId,
    readiness: Readiness,
    user_id: RwLock<Option<String>>,
}

impl SessionState {
    /// Create a session with nothing loaded.
    pub fn new(id: SessionId) -> Self {
        Self {
            id,
            readiness: Readiness::default(),
            user_id: RwLock::new(None),
        }
    }

    /// Session identifier.
    pub fn id(&self) -> &SessionId {
        &self.id
    }

    /// Readiness flags.
    pub fn readiness(&self) -> &Readiness {
        &self.readiness
    }

    /// Logged-in user, if any.
    pub fn user_id(&self) -> Option<String> {
        self.user_id.read().clone()
    }

    /// Bind the session to a user and mark its resources loaded.
    pub fn establish(&self, user_id: impl Into<String>) {
        *self.user_id.write() = Some(user_id.into());
        self.readiness.mark_all_loaded();
    }

    /// Unbind the user and clear readiness.
    pub fn clear(&self) {
        *self.user_id.write() = None;
        self.readiness.reset();
    }
}

impl Default for SessionState {
    fn default() -> Self {
        Self::new(SessionId::new())
    }
}
