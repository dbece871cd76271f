//! 병렬 학습 엔진
//!
//! 공유 임베딩 저장소를 소유하고, 간선들을 워커 스레드에 분할하며,
//! 벡터 단위 try-lock 낙관적 잠금(HogWild 스타일)으로 학습 스텝을 수행합니다.
//! 잠금 경합으로 버려진 업데이트는 오류가 아니라 스킵 카운터로 기록되는
//! 명시적 트레이드오프입니다. 스레드가 1일 때만 종단 간 결정적입니다.

use std::fs::File;
use std::io::{BufRead, BufReader, BufWriter, Write};
use std::path::Path;
use std::thread;
use std::time::Instant;

use anyhow::{ensure, Context, Result};
use indicatif::{ProgressBar, ProgressStyle};
use parking_lot::{Mutex, MutexGuard};
use rand::{rngs::StdRng, SeedableRng};
use rayon::prelude::*;

use crate::core::config::TrainConfig;
use crate::core::digraph::Digraph;
use crate::core::model::RiemannianModel;
use crate::core::sampler::NegativeSampler;
use crate::core::vector::{random_hyperboloid_point, ManifoldVector};

/// 진행률 보고 주기 (처리한 간선 수 기준)
const REPORTING_INTERVAL: u64 = 250;

/// 에포크 워커 스레드 하나의 집계 결과
struct EpochStats {
    performance: f64,
    iterated: u64,
    skipped: u64,
    update_count: u64,
    pullback_count: u64,
}

/// 임베딩 저장소와 잠금 배열을 소유하는 병렬 트레이너
///
/// 노드 id마다 `Mutex<ManifoldVector>` 셀 하나: 뮤텍스가 벡터별 잠금 플래그이고
/// 보호 대상이 임베딩 자신입니다. 잠금은 학습 스텝 동안만 비차단(try-lock)으로
/// 획득되며, 스텝을 넘겨 유지되지 않습니다.
pub struct PoincareTrainer {
    config: TrainConfig,
    digraph: Digraph,
    sampler: NegativeSampler,
    vectors: Vec<Mutex<ManifoldVector>>,
    performance: f64,
}

impl PoincareTrainer {
    /// 설정의 그래프 파일을 적재해 트레이너 구성
    pub fn new(config: TrainConfig) -> Result<Self> {
        let digraph = Digraph::load(&config.graph)?;
        Self::from_digraph(config, digraph)
    }

    /// 이미 적재된 그래프로 트레이너 구성
    ///
    /// 샘플링 테이블을 만들고, 시드로부터 결정적으로 임베딩을 초기화한 뒤,
    /// 설정에 입력 벡터 파일이 있으면 그 값으로 덮어씁니다.
    pub fn from_digraph(config: TrainConfig, digraph: Digraph) -> Result<Self> {
        config.validate()?;

        let counts: Vec<u64> = (0..digraph.node_count())
            .map(|id| digraph.target_count(id))
            .collect();
        log::info!("네거티브 샘플링 테이블 생성 중...");
        let sampler =
            NegativeSampler::new(config.distribution_power, &counts, config.negative_table_size);

        let mut rng = StdRng::seed_from_u64(config.seed);
        let vectors: Vec<Mutex<ManifoldVector>> = (0..digraph.node_count())
            .map(|_| {
                Mutex::new(random_hyperboloid_point(
                    config.dimension + 1,
                    &mut rng,
                    config.init_std_dev,
                ))
            })
            .collect();

        let mut trainer = Self {
            config,
            digraph,
            sampler,
            vectors,
            performance: 0.0,
        };
        if let Some(path) = trainer.config.input_vectors.clone() {
            log::info!("초기 벡터 적재: {}", path.display());
            trainer.load_vectors(&path)?;
        }
        Ok(trainer)
    }

    /// 에포크 전체를 돌며 학습
    ///
    /// 학습률은 에포크에 걸쳐 start_lr에서 end_lr로 선형 보간되고(외부 스케줄),
    /// 각 에포크 안에서는 스레드별 간선 진행률에 비례해 보간됩니다(내부 스케줄).
    /// 에포크마다 워커 스레드를 새로 만들어 끝까지 합류시킵니다.
    pub fn train(&mut self) -> Result<()> {
        let epochs = self.config.epochs;
        let threads = self.config.threads;
        let lr_delta_per_epoch = (self.config.start_lr - self.config.end_lr) / epochs as f64;

        for epoch in 0..epochs {
            self.save_checkpoint(epoch)?;
            log::info!("에포크 {} / {}", epoch + 1, epochs);
            let epoch_start_lr = self.config.start_lr - epoch as f64 * lr_delta_per_epoch;
            let epoch_end_lr = self.config.start_lr - (epoch + 1) as f64 * lr_delta_per_epoch;

            let progress = if self.config.verbose {
                let bar = ProgressBar::new((self.digraph.edge_count() / threads) as u64);
                bar.set_style(
                    ProgressStyle::default_bar()
                        .template("[{bar:40}] {percent}% 간선 {pos}/{len} {msg}")
                        .expect("진행률 바 템플릿이 유효해야 함"),
                );
                Some(bar)
            } else {
                None
            };

            let started = Instant::now();
            let this: &Self = &*self;
            let stats: Vec<EpochStats> = thread::scope(|scope| {
                let mut handles = Vec::with_capacity(threads);
                for thread_id in 0..threads {
                    let thread_seed =
                        this.config.seed + (epoch * threads + thread_id) as u64;
                    let bar = if thread_id == 0 { progress.as_ref() } else { None };
                    handles.push(scope.spawn(move || {
                        this.epoch_thread(thread_id, thread_seed, epoch_start_lr, epoch_end_lr, bar)
                    }));
                }
                handles
                    .into_iter()
                    .map(|handle| handle.join().expect("에포크 워커 스레드 패닉"))
                    .collect()
            });
            if let Some(bar) = progress {
                bar.finish_and_clear();
            }

            self.performance =
                stats.iter().map(|s| s.performance).sum::<f64>() / threads as f64;
            let iterated: u64 = stats.iter().map(|s| s.iterated).sum();
            let skipped: u64 = stats.iter().map(|s| s.skipped).sum();
            let updates: u64 = stats.iter().map(|s| s.update_count).sum();
            let pullbacks: u64 = stats.iter().map(|s| s.pullback_count).sum();
            log::info!(
                "에포크 {:.3}초 소요; 평균 목적값 {:.3}; 잠금 스킵 {}/{}; 풀백 {}/{}",
                started.elapsed().as_secs_f64(),
                self.performance,
                skipped,
                iterated,
                pullbacks,
                updates,
            );
        }
        self.save_checkpoint(epochs)?;
        Ok(())
    }

    /// 워커 스레드 본체: 고정 보폭 분할(간선 i → 스레드 i mod T)로 배정된
    /// 간선들을 순서대로 처리
    fn epoch_thread(
        &self,
        thread_id: usize,
        thread_seed: u64,
        start_lr: f64,
        end_lr: f64,
        progress: Option<&ProgressBar>,
    ) -> EpochStats {
        // 스레드 0 / 에포크 0 조합의 원시 시드 0을 피하기 위해 1을 더함
        let mut rng = StdRng::seed_from_u64(1 + thread_seed);
        let threads = self.config.threads;
        let edges_per_thread = (self.digraph.edge_count() / threads).max(1);
        let mut model =
            RiemannianModel::new(self.config.additive_updates, self.config.max_step_size);

        let mut iter_count = 0u64;
        let mut skipped = 0u64;
        for i in (thread_id..self.digraph.edge_count()).step_by(threads) {
            let (source, target) = self.digraph.edge(i);
            iter_count += 1;
            let progress_ratio = iter_count as f64 / edges_per_thread as f64;
            let lr = start_lr * (1.0 - progress_ratio) + end_lr * progress_ratio;

            let Some((mut source_guard, mut samples)) =
                self.obtain_vectors(source, target, &mut rng)
            else {
                // 필요한 잠금 중 하나를 얻지 못함: 재시도 없이 다음 간선으로
                skipped += 1;
                continue;
            };
            let mut candidates: Vec<&mut ManifoldVector> =
                samples.iter_mut().map(|guard| &mut **guard).collect();
            model.objective_and_update(&mut source_guard, &mut candidates, lr);
            // 가드 드롭으로 모든 잠금 해제

            if let Some(bar) = progress {
                if iter_count % REPORTING_INTERVAL == 0 {
                    bar.set_position(iter_count);
                    bar.set_message(format!("lr {:.3}", lr));
                }
            }
        }

        EpochStats {
            performance: model.read_and_reset_performance(),
            iterated: iter_count,
            skipped,
            update_count: model.update_count,
            pullback_count: model.pullback_count,
        }
    }

    /// 학습 스텝에 필요한 벡터 집합의 전부-아니면-전무 잠금 획득
    ///
    /// 소스를 try-lock하고, 실패하면 아무 효과 없이 반환합니다. 성공하면
    /// 타깃을 try-lock하고, 실패 시 소스 잠금을 되돌리고 반환합니다.
    /// 이후 소스의 실제 나가는 이웃들을 제외하고 네거티브를 뽑아 각각
    /// try-lock하며, 이미 잠긴 후보는 단순히 다시 뽑습니다. 이 루프는
    /// 상한이 없어서 잠글 수 있는 id가 너무 적으면 멈추지 않을 수 있습니다
    /// (재시도 상한을 두지 않는 것이 의도된 동작).
    ///
    /// 성공 시 (소스 가드, [타깃, 네거티브...] 가드들)을 반환하며, 해제는
    /// 모든 종료 경로에서 가드 드롭으로 이뤄집니다. 네거티브들은 같은 id의
    /// 두 번째 try-lock이 실패하므로 서로 겹치지 않음이 보장됩니다.
    fn obtain_vectors(
        &self,
        source: usize,
        target: usize,
        rng: &mut StdRng,
    ) -> Option<(
        MutexGuard<'_, ManifoldVector>,
        Vec<MutexGuard<'_, ManifoldVector>>,
    )> {
        let source_guard = self.vectors[source].try_lock()?;
        let Some(target_guard) = self.vectors[target].try_lock() else {
            return None;
        };
        let mut samples = Vec::with_capacity(self.config.number_negatives + 1);
        samples.push(target_guard);
        let exclude = self.digraph.out_neighbors(source);
        while samples.len() < self.config.number_negatives + 1 {
            let negative = self.sampler.get_sample(exclude, rng);
            if let Some(guard) = self.vectors[negative].try_lock() {
                samples.push(guard);
            }
        }
        Some((source_guard, samples))
    }

    /// 체크포인트 주기가 현재 에포크 수를 나누면 벡터 저장
    ///
    /// 파일 이름은 사전순 정렬이 유지되도록 에포크 번호를 0으로 패딩하고
    /// 현재 성능 지표(유효숫자 3자리)를 포함합니다.
    fn save_checkpoint(&self, epochs_trained: usize) -> Result<()> {
        let interval = self.config.checkpoint_interval;
        if interval > 0 && epochs_trained % interval as usize == 0 {
            let filename = format!(
                "{}-after-{:06}-epochs-objective-{}",
                self.config.output_vectors.display(),
                epochs_trained,
                format_objective(self.performance),
            );
            log::info!("체크포인트 저장: {}", filename);
            self.save_vectors(Path::new(&filename))?;
        }
        Ok(())
    }

    /// 모든 임베딩을 푸앵카레 볼 좌표로 변환해 텍스트 파일로 저장
    ///
    /// 행 형식: `name c0 c1 ... c_{d-1}` (시간꼴 슬롯은 기록하지 않음).
    pub fn save_vectors(&self, path: &Path) -> Result<()> {
        let dimension = self.config.dimension;
        let rows: Vec<String> = (0..self.digraph.node_count())
            .into_par_iter()
            .map(|id| {
                let mut vector = self.vectors[id].lock().clone();
                vector.to_ball_point();
                let mut row = String::from(self.digraph.name(id));
                for k in 0..dimension {
                    row.push(' ');
                    row.push_str(&vector[k].to_string());
                }
                row
            })
            .collect();

        let file = File::create(path)
            .with_context(|| format!("{} 파일에 쓸 수 없음", path.display()))?;
        let mut writer = BufWriter::new(file);
        for row in rows {
            writeln!(writer, "{}", row)?;
        }
        writer.flush()?;
        Ok(())
    }

    /// 볼 좌표 벡터 파일을 읽어 모델 파라미터로 적재
    ///
    /// 각 행은 노드 이름과 정확히 dimension개의 좌표여야 하고, 모르는
    /// 이름은 치명적 오류입니다. 읽은 볼 좌표는 하이퍼볼로이드 형태로
    /// 변환되어 저장됩니다.
    pub fn load_vectors(&mut self, path: &Path) -> Result<()> {
        let dimension = self.config.dimension;
        let file =
            File::open(path).with_context(|| format!("{} 파일을 열 수 없음", path.display()))?;
        for (line_number, line) in BufReader::new(file).lines().enumerate() {
            let line = line?;
            if line.is_empty() {
                continue;
            }
            let mut fields = line.split(' ');
            let name = fields
                .next()
                .with_context(|| format!("벡터 파일 {}행이 비어 있음", line_number + 1))?;
            let id = self.digraph.id_of(name)?;
            let coordinates: Vec<f64> = fields
                .map(|field| field.parse::<f64>())
                .collect::<Result<_, _>>()
                .with_context(|| format!("벡터 파일 {}행의 좌표 파싱 실패", line_number + 1))?;
            ensure!(
                coordinates.len() == dimension,
                "벡터 파일 {}행: 좌표가 {}개여야 하는데 {}개임",
                line_number + 1,
                dimension,
                coordinates.len()
            );
            let vector = self.vectors[id].get_mut();
            for (k, &coordinate) in coordinates.iter().enumerate() {
                vector[k] = coordinate;
            }
            vector.to_hyperboloid_point();
        }
        Ok(())
    }

    /// 마지막 에포크의 평균 목적값
    pub fn performance(&self) -> f64 {
        self.performance
    }

    pub fn digraph(&self) -> &Digraph {
        &self.digraph
    }

    /// id 노드의 현재 임베딩 사본 (하이퍼볼로이드 좌표)
    pub fn vector(&self, id: usize) -> ManifoldVector {
        self.vectors[id].lock().clone()
    }
}

/// C++ 기본 부동소수점 포맷의 setprecision(3)처럼 유효숫자 3자리로 표기
/// (후행 0과 소수점 제거)
pub(crate) fn format_objective(value: f64) -> String {
    if value == 0.0 {
        return "0".to_string();
    }
    let exponent = value.abs().log10().floor() as i32;
    let decimals = (2 - exponent).max(0) as usize;
    let mut formatted = format!("{:.*}", decimals, value);
    if formatted.contains('.') {
        while formatted.ends_with('0') {
            formatted.pop();
        }
        if formatted.ends_with('.') {
            formatted.pop();
        }
    }
    formatted
}
