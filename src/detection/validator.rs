//! 候选框合理性校验 (Candidate plausibility gate)

use super::types::Candidate;

/// 正方形基准长宽比,容差在此基础上放宽
const BASE_ASPECT: f64 = 2.0;

/// 校验失败原因 (仅用于日志,不作为错误向上传递)
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Rejection {
    AreaOutOfRange { area: i64 },
    Degenerate,
    AspectOutOfRange { aspect: f64 },
    MalformedCorners { count: usize },
}

/// 候选框校验器
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct CandidateValidator {
    pub min_area: u32,
    pub max_area: u32,
    pub aspect_tolerance: f64,
}

impl CandidateValidator {
    pub fn new(min_area: u32, max_area: u32, aspect_tolerance: f64) -> Self {
        Self {
            min_area,
            max_area,
            aspect_tolerance,
        }
    }

    pub fn validate(&self, c: &Candidate) -> bool {
        self.check(c).is_ok()
    }

    /// 返回第一条未通过的规则
    pub fn check(&self, c: &Candidate) -> Result<(), Rejection> {
        let area = c.rect.area();
        if area < self.min_area as i64 || area > self.max_area as i64 {
            return Err(Rejection::AreaOutOfRange { area });
        }

        let aspect = c.rect.aspect().ok_or(Rejection::Degenerate)?;
        if aspect > BASE_ASPECT + self.aspect_tolerance {
            return Err(Rejection::AspectOutOfRange { aspect });
        }

        if c.corners.len() != 4 {
            return Err(Rejection::MalformedCorners {
                count: c.corners.len(),
            });
        }

        Ok(())
    }
}

/// 函数式入口
pub fn validate(c: &Candidate, min_area: u32, max_area: u32, aspect_tolerance: f64) -> bool {
    CandidateValidator::new(min_area, max_area, aspect_tolerance).validate(c)
}
