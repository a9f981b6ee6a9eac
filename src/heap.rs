use im::HashMap;

use crate::value::Sexp;

/// Handle to a [`ConsCell`] in the arena. Identity-comparable, `Copy`, and
/// stable for the lifetime of the owning [`crate::Environment`]; the arena
/// never reclaims or reuses slots.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct MemoryLocation(u32);

/// Handle to a [`CallFrame`] in the arena.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct FrameLocation(u32);

/// Handle to a [`UserProc`] record in the arena.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct ProcLocation(u32);

/// A single pair. Chains of cells form lists: a proper list's `cdr` is
/// either `Nil` or another `Reference`. Cells may be aliased by several
/// parent structures at once, which is why they live behind handles.
#[derive(Clone, Debug)]
pub struct ConsCell {
    pub car: Sexp,
    pub cdr: Sexp,
}

/// One link of the lexical scope chain: variable bindings plus the frame
/// this one was opened under. The chain is acyclic and always terminates at
/// the global frame (`parent == None`).
#[derive(Clone, Debug)]
pub struct CallFrame {
    pub bindings: HashMap<String, Sexp>,
    pub parent: Option<FrameLocation>,
}

impl CallFrame {
    pub fn new(parent: Option<FrameLocation>) -> Self {
        CallFrame {
            bindings: HashMap::new(),
            parent,
        }
    }
}

/// A closure record: parameter names in order, the first cell of the body
/// form list, and the frame that was current at definition time. Capturing
/// the defining frame, not the calling one, is what makes scoping lexical.
#[derive(Clone, Debug)]
pub struct UserProc {
    pub name: Option<String>,
    pub params: Vec<String>,
    pub body: MemoryLocation,
    pub closure: FrameLocation,
}

/// The arena backing every heap-resident interpreter object. Append-only
/// for the life of a session: handles are plain indices and stay valid until
/// the whole heap is dropped, so cells and frames can be shared freely
/// without ownership cycles.
#[derive(Debug, Default)]
pub struct Heap {
    cells: Vec<ConsCell>,
    frames: Vec<CallFrame>,
    procs: Vec<UserProc>,
}

impl Heap {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn alloc_cell(&mut self, car: Sexp, cdr: Sexp) -> MemoryLocation {
        let loc = MemoryLocation(self.cells.len() as u32);
        self.cells.push(ConsCell { car, cdr });
        loc
    }
    #[inline]
    pub fn cell(&self, loc: MemoryLocation) -> &ConsCell {
        &self.cells[loc.0 as usize]
    }
    #[inline]
    pub fn cell_mut(&mut self, loc: MemoryLocation) -> &mut ConsCell {
        &mut self.cells[loc.0 as usize]
    }

    pub fn alloc_frame(&mut self, frame: CallFrame) -> FrameLocation {
        let loc = FrameLocation(self.frames.len() as u32);
        self.frames.push(frame);
        loc
    }
    #[inline]
    pub fn frame(&self, loc: FrameLocation) -> &CallFrame {
        &self.frames[loc.0 as usize]
    }
    #[inline]
    pub fn frame_mut(&mut self, loc: FrameLocation) -> &mut CallFrame {
        &mut self.frames[loc.0 as usize]
    }

    pub fn alloc_proc(&mut self, proc: UserProc) -> ProcLocation {
        let loc = ProcLocation(self.procs.len() as u32);
        self.procs.push(proc);
        loc
    }
    #[inline]
    pub fn user_proc(&self, loc: ProcLocation) -> &UserProc {
        &self.procs[loc.0 as usize]
    }
    #[inline]
    pub fn user_proc_mut(&mut self, loc: ProcLocation) -> &mut UserProc {
        &mut self.procs[loc.0 as usize]
    }

    /// Number of cons cells ever allocated. Monotonic; nothing is reclaimed.
    pub fn total_cells(&self) -> usize {
        self.cells.len()
    }
}
