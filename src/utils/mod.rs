pub(crate) mod error_handler;
pub(crate) mod misc;
pub(crate) mod sequence_generator;
pub(crate) mod validation;

pub(crate) use error_handler::AppError;
pub(crate) use misc::get_epoch_ts;
pub(crate) use sequence_generator::next_seq_val;
pub(crate) use validation::validate_phonenumber;
pub(crate) use validation::ValidatedBody;
