use crate::heap::{CallFrame, FrameLocation, Heap};
use crate::util::{LispError, Result};
use crate::value::Sexp;

/// The interpreter session: the arena plus the active and global scope
/// frames. One `Environment` serves one evaluator; everything it allocates
/// lives until the `Environment` itself is dropped, at which point the whole
/// arena is released en masse.
#[derive(Debug)]
pub struct Environment {
    heap: Heap,
    curr_scope: FrameLocation,
    global_scope: FrameLocation,
}

impl Environment {
    pub fn new() -> Self {
        let mut heap = Heap::new();
        let global = heap.alloc_frame(CallFrame::new(None));
        Environment {
            heap,
            curr_scope: global,
            global_scope: global,
        }
    }

    pub fn heap(&self) -> &Heap {
        &self.heap
    }
    pub fn heap_mut(&mut self) -> &mut Heap {
        &mut self.heap
    }
    pub fn curr_scope(&self) -> FrameLocation {
        self.curr_scope
    }
    pub fn global_scope(&self) -> FrameLocation {
        self.global_scope
    }

    /// Walks from the current frame out to the global frame and returns the
    /// first binding found.
    pub fn lookup_binding(&self, name: &str) -> Option<Sexp> {
        let mut curr = Some(self.curr_scope);
        while let Some(loc) = curr {
            let frame = self.heap.frame(loc);
            if let Some(val) = frame.bindings.get(name) {
                return Some(val.clone());
            }
            curr = frame.parent;
        }
        None
    }

    /// Writes into the current frame only. An outer frame's binding of the
    /// same name is shadowed, never touched.
    pub fn define_binding(&mut self, name: String, value: Sexp) {
        self.heap
            .frame_mut(self.curr_scope)
            .bindings
            .insert(name, value);
    }

    /// Mutates the nearest enclosing frame that already binds `name`.
    /// Setting an unbound name is an error rather than a silent no-op.
    pub fn set_binding(&mut self, name: &str, value: Sexp) -> Result<()> {
        let mut curr = Some(self.curr_scope);
        while let Some(loc) = curr {
            let frame = self.heap.frame(loc);
            let found = frame.bindings.contains_key(name);
            let parent = frame.parent;
            if found {
                self.heap
                    .frame_mut(loc)
                    .bindings
                    .insert(name.to_owned(), value);
                return Ok(());
            }
            curr = parent;
        }
        Err(LispError::UndefinedVariable(name.to_owned()))
    }

    /// Opens a fresh frame chained under `parent`. Used for procedure calls,
    /// where `parent` is the procedure's captured frame.
    pub fn alloc_frame(&mut self, parent: FrameLocation) -> FrameLocation {
        self.heap.alloc_frame(CallFrame::new(Some(parent)))
    }

    /// Swaps the active scope, returning the previous one so the caller can
    /// restore it on every exit path.
    pub(crate) fn swap_scope(&mut self, frame: FrameLocation) -> FrameLocation {
        std::mem::replace(&mut self.curr_scope, frame)
    }
}

impl Default for Environment {
    fn default() -> Self {
        Self::new()
    }
}
