//! Engine-side interfaces consumed by the frame adapters.
//!
//! A disassembler session exposes frames through one of two member APIs.
//! The struct API ([`StructFrameApi`]) treats a frame as an aggregate of
//! members addressed by byte offset. The type-information API
//! ([`TypeInfoFrameApi`]) treats it as a type record whose members are
//! addressed by index and looked up through status codes. Both share the
//! function-level queries in [`FunctionQuery`].
//!
//! All methods take `&self`: sessions are single-threaded handles and mutate
//! through interior mutability, so every adapter over the same frame observes
//! the same state.

/// Address of a function entry point.
pub type Address = u64;

/// Failure reported by the engine session itself.
///
/// Adapters never interpret these; they pass through
/// [`FrameError::Engine`](crate::FrameError::Engine) unchanged.
pub type EngineError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Result of an engine call.
pub type EngineResult<T> = Result<T, EngineError>;

/// Status code the type-information API reports for a failed member lookup.
pub const UDM_NOT_FOUND: i64 = -1;

// ── Member model ─────────────────────────────────────────────────────────────

/// Attributes of one native frame member, as the engine reports them.
pub trait MemberInfo {
    /// Display name. Synthetic slots use reserved names such as `" s"`.
    fn name(&self) -> &str;

    /// Byte offset from the start of the frame aggregate.
    fn offset(&self) -> i64;

    /// Size in bytes.
    fn size(&self) -> u64;

    /// Declared type, if the engine has one.
    fn type_name(&self) -> Option<&str>;

    /// Member comment, if any.
    fn comment(&self) -> Option<&str>;
}

// ── Function queries ─────────────────────────────────────────────────────────

/// Function-level frame facts shared by both member APIs.
pub trait FunctionQuery {
    /// Resolved function handle.
    type Function;

    /// Resolve the function starting at `address`.
    fn function_at(&self, address: Address) -> EngineResult<Self::Function>;

    /// Native offset of the return-address slot within the function's frame.
    fn return_address_offset(&self, function: &Self::Function) -> i64;

    /// Bytes reserved for the return address; zero means no explicit slot.
    fn return_address_size(&self, function: &Self::Function) -> u64;
}

// ── Struct API ───────────────────────────────────────────────────────────────

/// Struct-style frame access: members by byte offset and name.
pub trait StructFrameApi: FunctionQuery {
    /// Native frame aggregate handle.
    type Struct;
    /// Member handle.
    type Member: MemberInfo;

    /// Engine identifier of the frame aggregate.
    fn struct_id(&self, frame: &Self::Struct) -> u64;

    /// Entry address of the function owning the frame with id `frame_id`.
    fn function_by_frame(&self, frame_id: u64) -> EngineResult<Address>;

    /// Member covering native byte `offset`.
    fn member_at(&self, frame: &Self::Struct, offset: i64) -> Option<Self::Member>;

    /// Member named exactly `name`.
    fn member_by_name(&self, frame: &Self::Struct, name: &str) -> Option<Self::Member>;

    /// Member at `index` in native order.
    fn member_by_index(&self, frame: &Self::Struct, index: usize) -> Option<Self::Member>;

    /// Number of native members, synthetic ones included.
    fn member_count(&self, frame: &Self::Struct) -> usize;

    /// Remove the member covering native byte `offset`.
    fn delete_member(&self, frame: &Self::Struct, offset: i64) -> EngineResult<()>;
}

// ── Type-information API ─────────────────────────────────────────────────────

/// Type-information frame access: members ("udms") by index.
///
/// Lookups return a status code alongside the member handle. The code is the
/// member index on success and [`UDM_NOT_FOUND`] otherwise, in which case the
/// handle is an empty default.
pub trait TypeInfoFrameApi: FunctionQuery {
    /// Native frame type record handle.
    type Udt;
    /// Member handle.
    type Udm: MemberInfo + Default;

    /// Engine type identifier of the frame record.
    fn type_id(&self, frame: &Self::Udt) -> u64;

    /// Entry address of the function owning the frame record.
    fn frame_function(&self, frame: &Self::Udt) -> EngineResult<Address>;

    /// Member covering native byte `offset`.
    fn udm_by_offset(&self, frame: &Self::Udt, offset: i64) -> (i64, Self::Udm);

    /// Member named exactly `name`.
    fn udm_by_name(&self, frame: &Self::Udt, name: &str) -> (i64, Self::Udm);

    /// Member at `index` in native order.
    fn udm_by_index(&self, frame: &Self::Udt, index: usize) -> Option<Self::Udm>;

    /// Number of native members, synthetic ones included.
    fn udm_count(&self, frame: &Self::Udt) -> usize;

    /// Remove members `first..=last`.
    fn delete_udms(&self, frame: &Self::Udt, first: usize, last: usize) -> EngineResult<()>;
}
