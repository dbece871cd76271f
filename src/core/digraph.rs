//! 유향 그래프 로더
//!
//! "source<TAB>target" 형식의 텍스트 간선 목록을 읽어 조밀한 정수 id
//! ("enumeration")로 주소화되는 노드 아레나와 순서 있는 간선 목록을 만듭니다.
//! 그래프가 완전히 적재된 후에는 불변이며, 학습 스레드들이 동기화 없이
//! 읽습니다.

use std::collections::HashMap;
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

use anyhow::{bail, Context, Result};

/// 그래프의 노드 하나
///
/// 파싱 중 이름이 처음 등장할 때 한 번 생성되고, id는 0부터 연속으로 부여됩니다.
#[derive(Debug, Clone)]
pub struct Node {
    /// 고유한 노드 이름
    pub name: String,
    /// 조밀한 정수 id (0-based)
    pub enumeration: usize,
    /// 출발점으로 등장한 횟수 (out-degree)
    pub count_as_source: u64,
    /// 도착점으로 등장한 횟수 (in-degree, 네거티브 샘플러의 빈도 신호)
    pub count_as_target: u64,
    /// 나가는 이웃 id 목록 (간선 생성 순서)
    pub target_enums: Vec<usize>,
}

impl Node {
    pub fn new(name: &str, enumeration: usize) -> Self {
        Self {
            name: name.to_string(),
            enumeration,
            count_as_source: 0,
            count_as_target: 0,
            target_enums: Vec::new(),
        }
    }
}

/// 노드 아레나 + 간선 목록으로 구성된 유향 그래프
#[derive(Debug, Default)]
pub struct Digraph {
    nodes: Vec<Node>,
    name_to_enum: HashMap<String, usize>,
    edges: Vec<(usize, usize)>,
}

impl Digraph {
    /// 탭 구분 간선 목록을 읽어 그래프 구성
    ///
    /// 각 행은 정확히 두 개의 탭 구분 필드여야 하며, 그 외 필드 수는
    /// 치명적 파싱 오류입니다. 후행 개행은 허용되고 빈 입력은 빈 그래프입니다.
    pub fn from_reader(reader: impl BufRead) -> Result<Self> {
        let mut digraph = Self::default();
        for (line_number, line) in reader.lines().enumerate() {
            let line = line?;
            let mut fields = line.split('\t');
            let (source_name, target_name) = match (fields.next(), fields.next(), fields.next()) {
                (Some(source), Some(target), None) => (source, target),
                _ => bail!(
                    "그래프 {}행: 탭 구분 필드가 정확히 2개여야 함: {:?}",
                    line_number + 1,
                    line
                ),
            };
            let source = digraph.intern(source_name);
            let target = digraph.intern(target_name);
            digraph.add_edge(source, target);
        }
        Ok(digraph)
    }

    /// 파일 경로로부터 그래프 적재
    pub fn load(path: &Path) -> Result<Self> {
        let file =
            File::open(path).with_context(|| format!("{} 파일을 열 수 없음", path.display()))?;
        Self::from_reader(BufReader::new(file))
    }

    /// 이름에 해당하는 노드 id를 반환하고, 처음 보는 이름이면 새 노드 생성
    fn intern(&mut self, name: &str) -> usize {
        if let Some(&enumeration) = self.name_to_enum.get(name) {
            return enumeration;
        }
        let enumeration = self.nodes.len();
        self.nodes.push(Node::new(name, enumeration));
        self.name_to_enum.insert(name.to_string(), enumeration);
        enumeration
    }

    /// 간선 추가: 출발 노드의 out-count와 이웃 목록, 도착 노드의 in-count 갱신
    fn add_edge(&mut self, source: usize, target: usize) {
        self.nodes[source].count_as_source += 1;
        self.nodes[source].target_enums.push(target);
        self.nodes[target].count_as_target += 1;
        self.edges.push((source, target));
    }

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    pub fn edge_count(&self) -> usize {
        self.edges.len()
    }

    /// i번째 간선의 (source id, target id)
    pub fn edge(&self, i: usize) -> (usize, usize) {
        self.edges[i]
    }

    /// 노드의 나가는 이웃 id 목록
    pub fn out_neighbors(&self, id: usize) -> &[usize] {
        &self.nodes[id].target_enums
    }

    /// 노드가 도착점으로 등장한 횟수 (네거티브 샘플링 빈도)
    pub fn target_count(&self, id: usize) -> u64 {
        self.nodes[id].count_as_target
    }

    pub fn name(&self, id: usize) -> &str {
        &self.nodes[id].name
    }

    /// 이름으로 노드 id 조회, 모르는 이름이면 오류
    pub fn id_of(&self, name: &str) -> Result<usize> {
        self.name_to_enum
            .get(name)
            .copied()
            .with_context(|| format!("그래프에 없는 노드 이름: {}", name))
    }

    pub fn node(&self, id: usize) -> &Node {
        &self.nodes[id]
    }
}
