use autodim_io::IoError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum FrontendError {
    #[error("平面图读写失败: {0}")]
    Io(#[from] IoError),
    #[error("命令执行失败: {0}")]
    Command(String),
}
