use std::env;
use std::path::{Path, PathBuf};

use autodim_engine::session::{DemoPlan, Session};
use autodim_io::{DocumentLoader, PlanFacade};
use tracing::{info, warn};

use crate::errors::FrontendError;

/// 未显式指定平面图时读取的环境变量。
pub const PLAN_ENV: &str = "AUTODIM_PLAN";

/// 文档来源，便于前端呈现加载信息。
#[derive(Debug, Clone)]
pub enum PlanSource {
    File(PathBuf),
    Demo,
}

/// 统一封装加载后的会话与元信息。
#[derive(Debug)]
pub struct LoadedSession {
    pub session: Session,
    pub source: PlanSource,
    pub demo: Option<DemoPlan>,
}

/// 按优先级加载平面图：显式路径（失败即报错）、环境变量 `AUTODIM_PLAN`
/// （失败回退到内置示例）、内置示例。
pub fn load_session(explicit: Option<&Path>) -> Result<LoadedSession, FrontendError> {
    let loader = PlanFacade::new();

    if let Some(path) = explicit {
        let document = loader.load(path)?;
        info!(path = %path.display(), "从 JSON 加载平面图成功");
        return Ok(LoadedSession {
            session: Session::with_document(document),
            source: PlanSource::File(path.to_path_buf()),
            demo: None,
        });
    }

    if let Some(path) = env::var_os(PLAN_ENV) {
        let path = PathBuf::from(path);
        match loader.load(&path) {
            Ok(document) => {
                info!(path = %path.display(), "从 JSON 加载平面图成功");
                return Ok(LoadedSession {
                    session: Session::with_document(document),
                    source: PlanSource::File(path),
                    demo: None,
                });
            }
            Err(err) => {
                warn!(path = %path.display(), error = %err, "加载平面图失败，回退到内置示例");
            }
        }
    }

    Ok(demo_session())
}

pub fn demo_session() -> LoadedSession {
    let mut session = Session::new();
    let demo = session.populate_demo();
    LoadedSession {
        session,
        source: PlanSource::Demo,
        demo: Some(demo),
    }
}
