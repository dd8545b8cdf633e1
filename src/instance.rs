//! Type-erased service values
//!
//! An [`Instance`] is what the registry hands out for a name. It wraps one
//! shared allocation and remembers every type that allocation may be assigned
//! to: the type it was registered as, plus any capability trait objects
//! declared with [`Instance::provides`] or the [`instance!`](crate::instance)
//! macro. Assignability is a lookup of the requested type in that view list.

use crate::Injectable;
use std::any::{Any, TypeId};
use std::fmt;
use std::sync::Arc;

/// One type an instance can be handed out as.
#[derive(Clone)]
struct View {
    type_id: TypeId,
    type_name: &'static str,
    /// Always holds an `Arc<X>` where `X` is the viewed type
    handle: Arc<dyn Any + Send + Sync>,
}

impl View {
    #[inline]
    fn of<X: ?Sized + Send + Sync + 'static>(value: Arc<X>) -> Self {
        Self {
            type_id: TypeId::of::<X>(),
            type_name: std::any::type_name::<X>(),
            handle: Arc::new(value) as Arc<dyn Any + Send + Sync>,
        }
    }
}

/// A shared, type-erased service value.
///
/// Cloning an `Instance` never clones the underlying value: every clone, and
/// every `Arc` obtained through [`downcast`](Instance::downcast), points at
/// the same allocation.
///
/// # Examples
///
/// ```rust
/// use xcomp::Instance;
/// use std::sync::Arc;
///
/// trait Closer: Send + Sync {
///     fn close(&self) -> Result<(), String>;
/// }
///
/// struct FileStore;
///
/// impl Closer for FileStore {
///     fn close(&self) -> Result<(), String> { Ok(()) }
/// }
///
/// let store = Arc::new(FileStore);
/// let instance = Instance::from_arc(Arc::clone(&store))
///     .provides::<dyn Closer>(store);
///
/// assert!(instance.downcast::<FileStore>().is_some());
/// assert!(instance.downcast::<dyn Closer>().is_some());
/// assert!(instance.downcast::<String>().is_none());
/// ```
#[derive(Clone)]
pub struct Instance {
    /// `views[0]` is the registered type; the rest are capabilities
    views: Arc<Vec<View>>,
    /// Data address of the shared value, used for identity checks
    addr: usize,
}

impl Instance {
    /// Wrap an owned value.
    #[inline]
    pub fn new<T: Injectable>(value: T) -> Self {
        Self::from_arc(Arc::new(value))
    }

    /// Wrap an existing `Arc`. `T` may be a trait object, in which case the
    /// instance is only assignable to `Arc<T>` (plus any declared capabilities).
    #[inline]
    pub fn from_arc<T: ?Sized + Send + Sync + 'static>(value: Arc<T>) -> Self {
        let addr = Arc::as_ptr(&value) as *const () as usize;
        Self {
            views: Arc::new(vec![View::of(value)]),
            addr,
        }
    }

    /// Declare an additional type this instance can be assigned to.
    ///
    /// `view` should be the same allocation coerced to the capability, e.g.
    /// `Arc::clone(&store) as Arc<dyn Closer>`. Declaring the same type twice
    /// replaces the earlier view.
    pub fn provides<I: ?Sized + Send + Sync + 'static>(mut self, view: Arc<I>) -> Self {
        debug_assert_eq!(
            Arc::as_ptr(&view) as *const () as usize,
            self.addr,
            "capability view must share the instance's allocation"
        );

        let view = View::of(view);
        let views = Arc::make_mut(&mut self.views);
        match views.iter_mut().find(|v| v.type_id == view.type_id) {
            Some(existing) => *existing = view,
            None => views.push(view),
        }
        self
    }

    /// Get the value as `Arc<X>` if `X` is the registered type or one of the
    /// declared capabilities.
    #[inline]
    pub fn downcast<X: ?Sized + Send + Sync + 'static>(&self) -> Option<Arc<X>> {
        let wanted = TypeId::of::<X>();
        self.views
            .iter()
            .find(|v| v.type_id == wanted)
            .and_then(|v| v.handle.downcast_ref::<Arc<X>>())
            .cloned()
    }

    /// Check whether this instance is assignable to `Arc<X>`.
    #[inline]
    pub fn is<X: ?Sized + 'static>(&self) -> bool {
        let wanted = TypeId::of::<X>();
        self.views.iter().any(|v| v.type_id == wanted)
    }

    /// Name of the registered type.
    #[inline]
    pub fn type_name(&self) -> &'static str {
        self.views[0].type_name
    }

    /// Names of every assignable type, registered type first.
    pub fn view_names(&self) -> Vec<&'static str> {
        self.views.iter().map(|v| v.type_name).collect()
    }

    /// Whether both instances wrap the same allocation.
    #[inline]
    pub fn same_instance(&self, other: &Instance) -> bool {
        self.addr == other.addr
    }
}

impl fmt::Debug for Instance {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Instance")
            .field("type_name", &self.type_name())
            .field("views", &self.view_names())
            .finish()
    }
}

/// Build an [`Instance`] from a value, optionally declaring capabilities.
///
/// ```rust
/// use xcomp::instance;
///
/// trait Named: Send + Sync {
///     fn name(&self) -> &str;
/// }
///
/// struct Repo;
///
/// impl Named for Repo {
///     fn name(&self) -> &str { "repo" }
/// }
///
/// let plain = instance!(Repo);
/// assert!(plain.downcast::<dyn Named>().is_none());
///
/// let named = instance!(Repo => dyn Named);
/// assert_eq!(named.downcast::<dyn Named>().unwrap().name(), "repo");
/// ```
#[macro_export]
macro_rules! instance {
    ($value:expr $(=> $($view:ty),+ $(,)?)?) => {{
        let value = ::std::sync::Arc::new($value);
        $crate::Instance::from_arc(::std::sync::Arc::clone(&value))
            $($(.provides::<$view>(::std::sync::Arc::clone(&value) as ::std::sync::Arc<$view>))+)?
    }};
}
