use approx::{assert_abs_diff_eq, assert_relative_eq};
use rand::{rngs::StdRng, SeedableRng};

use crate::core::model::{RiemannianModel, MIN_STEP_SIZE};
use crate::core::vector::{distance, minkowski_dot, random_hyperboloid_point, ManifoldVector};

#[test]
fn 초기_성능은_0() {
    let mut model = RiemannianModel::new(false, 2.0);
    assert_eq!(model.read_and_reset_performance(), 0.0);
}

#[test]
fn 성능_읽기는_평균을_반환하고_리셋() {
    let mut rng = StdRng::seed_from_u64(7);
    let mut model = RiemannianModel::new(false, 2.0);
    let mut source = random_hyperboloid_point(3, &mut rng, 0.1);
    let mut target = random_hyperboloid_point(3, &mut rng, 0.1);
    {
        let mut candidates = [&mut target];
        model.objective_and_update(&mut source, &mut candidates, 0.01);
    }
    // 후보가 진짜 타깃 하나뿐이면 a_0/z = 1, 분모는 시작값 1 + 예제 1
    assert_relative_eq!(model.read_and_reset_performance(), 0.5);
    // 두 번째 읽기는 리셋된 기준값
    assert_eq!(model.read_and_reset_performance(), 0.0);
}

#[test]
fn 측지선_업데이트_후에도_하이퍼볼로이드_위() {
    let mut rng = StdRng::seed_from_u64(3);
    let mut model = RiemannianModel::new(false, 2.0);
    let mut source = random_hyperboloid_point(4, &mut rng, 0.2);
    let mut target = random_hyperboloid_point(4, &mut rng, 0.2);
    let mut negative = random_hyperboloid_point(4, &mut rng, 0.2);
    {
        let mut candidates = [&mut target, &mut negative];
        model.objective_and_update(&mut source, &mut candidates, 0.05);
    }
    for point in [&source, &target, &negative] {
        assert_relative_eq!(minkowski_dot(point, point), -1.0, epsilon = 1e-9);
    }
}

#[test]
fn 리트랙션_업데이트_후에도_하이퍼볼로이드_위() {
    let mut rng = StdRng::seed_from_u64(3);
    let mut model = RiemannianModel::new(true, 2.0);
    let mut source = random_hyperboloid_point(4, &mut rng, 0.2);
    let mut target = random_hyperboloid_point(4, &mut rng, 0.2);
    let mut negative = random_hyperboloid_point(4, &mut rng, 0.2);
    {
        let mut candidates = [&mut target, &mut negative];
        model.objective_and_update(&mut source, &mut candidates, 0.05);
    }
    for point in [&source, &target, &negative] {
        assert_relative_eq!(minkowski_dot(point, point), -1.0, epsilon = 1e-9);
    }
}

#[test]
fn 임계값_미만의_접벡터는_업데이트를_건너뜀() {
    let mut model = RiemannianModel::new(false, 2.0);
    let mut point = ManifoldVector::from_components(vec![0.0, 1.0]);
    let mut tangent = ManifoldVector::from_components(vec![MIN_STEP_SIZE / 100.0, 0.0]);
    let before = model.update_count;
    model.parameter_update(&mut point, &mut tangent);
    // 시도 횟수는 세지만 점은 움직이지 않음
    assert_eq!(model.update_count, before + 1);
    assert_eq!(point.as_slice(), &[0.0, 1.0]);
}

#[test]
fn 보폭은_최대_쌍곡_거리로_클리핑() {
    let mut model = RiemannianModel::new(false, 2.0);
    let basepoint = ManifoldVector::from_components(vec![0.0, 1.0]);
    let mut point = basepoint.clone();
    let mut tangent = ManifoldVector::from_components(vec![10.0, 0.0]);
    model.parameter_update(&mut point, &mut tangent);
    assert_relative_eq!(distance(&basepoint, &point), 2.0, epsilon = 1e-9);
}

#[test]
fn 보폭이_최대보다_작으면_그대로_이동() {
    let mut model = RiemannianModel::new(false, 2.0);
    let basepoint = ManifoldVector::from_components(vec![0.0, 1.0]);
    let mut point = basepoint.clone();
    let mut tangent = ManifoldVector::from_components(vec![0.5, 0.0]);
    model.parameter_update(&mut point, &mut tangent);
    assert_relative_eq!(distance(&basepoint, &point), 0.5, epsilon = 1e-9);
}

#[test]
fn 경계에_닿으면_풀백() {
    let mut model = RiemannianModel::new(true, 5.0);
    // 기준점에서 쌍곡 거리 5인 점 (볼 반지름 tanh(2.5) ≈ 0.9866)
    let hyperangle: f64 = 5.0;
    let mut point =
        ManifoldVector::from_components(vec![hyperangle.sinh(), 0.0, hyperangle.cosh()]);
    // 바깥 방향 단위 접벡터의 5배
    let mut tangent = ManifoldVector::from_components(vec![
        5.0 * hyperangle.cosh(),
        0.0,
        5.0 * hyperangle.sinh(),
    ]);
    assert_eq!(model.pullback_count, 0);
    model.parameter_update(&mut point, &mut tangent);
    assert_eq!(model.pullback_count, 1);
    // 풀백 후에도 하이퍼볼로이드 위의 유한한 점
    assert_relative_eq!(minkowski_dot(&point, &point), -1.0, epsilon = 1e-9);
    assert!(point.as_slice().iter().all(|c| c.is_finite()));
}

#[test]
fn 경계_안쪽의_리트랙션은_풀백_없음() {
    let mut model = RiemannianModel::new(true, 2.0);
    let mut point = ManifoldVector::from_components(vec![0.0, 0.0, 1.0]);
    let mut tangent = ManifoldVector::from_components(vec![0.1, 0.0, 0.0]);
    model.parameter_update(&mut point, &mut tangent);
    assert_eq!(model.pullback_count, 0);
    assert_relative_eq!(minkowski_dot(&point, &point), -1.0, epsilon = 1e-9);
}

#[test]
fn 학습은_타깃을_끌어당기고_네거티브를_밀어냄() {
    let mut rng = StdRng::seed_from_u64(11);
    let mut model = RiemannianModel::new(false, 2.0);
    let mut source = random_hyperboloid_point(5, &mut rng, 0.3);
    let mut target = random_hyperboloid_point(5, &mut rng, 0.3);
    let mut negative = random_hyperboloid_point(5, &mut rng, 0.3);
    let target_before = distance(&source, &target);
    let negative_before = distance(&source, &negative);
    for _ in 0..50 {
        let mut candidates = [&mut target, &mut negative];
        model.objective_and_update(&mut source, &mut candidates, 0.05);
    }
    assert!(distance(&source, &target) < target_before);
    assert!(distance(&source, &negative) > negative_before);
}

#[test]
fn 일치하는_벡터도_유한하게_처리() {
    // 소스와 후보가 같은 점이면 민코프스키 내적이 -1에 클램프됨
    let mut model = RiemannianModel::new(false, 2.0);
    let mut source = ManifoldVector::from_components(vec![0.0, 1.0]);
    let mut duplicate = ManifoldVector::from_components(vec![0.0, 1.0]);
    {
        let mut candidates = [&mut duplicate];
        model.objective_and_update(&mut source, &mut candidates, 0.05);
    }
    assert!(source.as_slice().iter().all(|c| c.is_finite()));
    assert!(duplicate.as_slice().iter().all(|c| c.is_finite()));
    assert_abs_diff_eq!(minkowski_dot(&source, &source), -1.0, epsilon = 1e-9);
}
