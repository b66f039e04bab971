//! The summary IR: a simplified, per-library, SSA-shaped description of
//! native functions limited to calls into the host-binding API, phi nodes,
//! and returns.

pub mod doc;
pub mod function;
pub mod inst;
pub mod module;
pub mod value;

pub use doc::{FunctionDoc, InstDoc, ModuleDoc};
pub use function::{DefUse, SummaryFunction, CALLBACK_INFO_TARGET, REAL_ARGS_TAG};
pub use inst::{CallInst, Inst, RetTable};
pub use module::SummaryModule;
pub use value::{
    set_value_ty, value_is_constant, value_name, value_token, value_ty, MalformedToken,
    SummaryValue, ValueRef, ValueTable,
};
