pub mod single;
pub mod multi;

pub use single::{apply_single_event, render_single, SingleEvent, SingleFormState, SingleView};
pub use multi::{
    apply_multi_event, render_multi, MultiEvent, MultiFormState, MultiView, MAX_SWITCH_NAME_CHARS,
};
