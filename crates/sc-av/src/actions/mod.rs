//! Media actions: speech synthesis, lip-sync inference, still-face video,
//! segment compositing, PDF text and page extraction, and text cards.

mod card;
mod composite;
mod lipsync;
mod pdf;
mod probe;
mod speech;
mod still;

pub use card::{render_text_card, wrap_text, TextCard};
pub use composite::{concat_list, concat_segments, overlay_filter, overlay_segment};
pub use lipsync::{run_wav2lip, Wav2LipParams};
pub use pdf::{pdf_page_texts, rasterize_pdf_page, split_pages};
pub use probe::audio_duration;
pub use speech::{list_voices, parse_voices, synthesize_speech, SpeechParams, Voice};
pub use still::{still_face_video, StillParams};
