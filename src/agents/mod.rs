pub mod readme_box;
pub mod section_editor;

pub use readme_box::{
    DEFAULT_COMMIT_MESSAGE, DEFAULT_README_PATH, Document, ReadmeBox, ReadmeUpdate, SectionUpdate,
    UpdateRequest,
};
pub use section_editor::{ReplaceSection, SectionEditor, SectionMarker};
