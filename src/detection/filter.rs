//! 移动平均滤波 (Geometry smoothing)
//!
//! - `smooth`: 一阶指数滤波,单目标跟踪使用 (响应快)
//! - `window_mean`: 窗口整数均值,多目标跟踪使用 (与顺序无关)

use super::types::Rect;

/// 指数移动平均: 每个分量 `floor(alpha*cur + (1-alpha)*prev)`
///
/// `alpha` 越大越跟随当前观测,越小越平稳。
pub fn smooth(prev: Rect, cur: Rect, alpha: f64) -> Rect {
    let blend = |p: i32, c: i32| (alpha * c as f64 + (1.0 - alpha) * p as f64).floor() as i32;
    Rect {
        x: blend(prev.x, cur.x),
        y: blend(prev.y, cur.y),
        w: blend(prev.w, cur.w),
        h: blend(prev.h, cur.h),
    }
}

/// 首帧无历史时直接以观测值作为初始状态
pub fn smooth_or_seed(prev: Option<Rect>, cur: Rect, alpha: f64) -> Rect {
    match prev {
        Some(prev) => smooth(prev, cur, alpha),
        None => cur,
    }
}

/// 逐分量整数均值 (向下取整); 空切片返回 `None`
pub fn window_mean(history: &[Rect]) -> Option<Rect> {
    if history.is_empty() {
        return None;
    }
    let n = history.len() as i64;
    let (mut sx, mut sy, mut sw, mut sh) = (0i64, 0i64, 0i64, 0i64);
    for r in history {
        sx += r.x as i64;
        sy += r.y as i64;
        sw += r.w as i64;
        sh += r.h as i64;
    }
    Some(Rect {
        x: sx.div_euclid(n) as i32,
        y: sy.div_euclid(n) as i32,
        w: sw.div_euclid(n) as i32,
        h: sh.div_euclid(n) as i32,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_smooth_step() {
        let out = smooth(Rect::new(0, 0, 10, 10), Rect::new(10, 10, 20, 20), 0.6);
        assert_eq!(out, Rect::new(6, 6, 16, 16));
    }

    #[test]
    fn test_seed_bypasses_filter() {
        let cur = Rect::new(33, 44, 55, 66);
        assert_eq!(smooth_or_seed(None, cur, 0.3), cur);
    }

    #[test]
    fn test_alpha_one_follows_input() {
        let cur = Rect::new(7, 8, 9, 10);
        assert_eq!(smooth(Rect::new(100, 100, 100, 100), cur, 1.0), cur);
    }

    #[test]
    fn test_converges_on_constant_input() {
        let target = Rect::new(100, 80, 40, 30);
        let mut state = Rect::new(0, 0, 10, 10);
        for _ in 0..60 {
            state = smooth(state, target, 0.6);
        }
        // floor 截断使稳态停在目标值下方至多1像素
        assert!((target.x - state.x) <= 1 && state.x <= target.x);
        assert!((target.y - state.y) <= 1 && state.y <= target.y);
        assert!((target.w - state.w) <= 1 && state.w <= target.w);
        assert!((target.h - state.h) <= 1 && state.h <= target.h);
    }

    #[test]
    fn test_window_mean_floors() {
        let hist = [Rect::new(0, 0, 10, 10), Rect::new(1, 3, 11, 10)];
        assert_eq!(window_mean(&hist), Some(Rect::new(0, 1, 10, 10)));
        assert_eq!(window_mean(&[]), None);
    }
}
