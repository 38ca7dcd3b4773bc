use crate::kripke::relations;
use crate::kripke::State;
use crate::language::Label;
use crate::util::SparseSet;
use crate::Agent;
use crate::World;
use std::collections::BTreeMap;
use std::collections::BTreeSet;

/// a fine block and the compound block that owns it, by arena index
#[derive(Debug)]
struct QBlock {
    elements: SparseSet,
    owner: usize,
}

/// a compound block: its fine blocks plus per-vertex successor counts
/// into the union of those blocks
#[derive(Debug)]
struct XBlock {
    subs: Vec<usize>,
    counts: Vec<u64>,
}

/// Scratch state of one Paige-Tarjan run over the agent-split graph.
struct Refiner {
    q_blocks: Vec<QBlock>,
    x_blocks: Vec<XBlock>,
    live: Vec<usize>,
    sinks: Vec<usize>,
    compound: BTreeSet<usize>,
    worlds_blocks: Vec<usize>,
    graph: Vec<SparseSet>,
    preimage: Vec<SparseSet>,
}

/// Full bisimulation contraction via three-partition Paige-Tarjan.
///
/// The multi-agent frame is first reduced to a single relation by
/// routing each edge `w -ag-> v` through a fresh vertex tagged with the
/// agent; the classical algorithm then runs on the unlabeled result and
/// the quotient is read back off the blocks of original worlds. The
/// returned flag is always true: the quotient is exact at every depth.
pub fn contract(s: &State) -> (bool, State) {
    let mut refiner = Refiner::new(s);
    while let Some(&splitter) = refiner.compound.iter().next() {
        refiner.compound.remove(&splitter);
        refiner.step(splitter);
    }
    (true, refiner.quotient(s))
}

impl Refiner {
    fn new(s: &State) -> Self {
        let (graph, tags) = agent_split(s);
        let vertices = graph.len();
        let mut preimage: Vec<SparseSet> = (0..vertices)
            .map(|_| SparseSet::with_universe(vertices))
            .collect();
        for (w, successors) in graph.iter().enumerate() {
            for v in successors.iter() {
                preimage[v].insert(w);
            }
        }

        // initial partition: original worlds by label with sinks set
        // aside (they can never split), agent vertices by tag
        let mut q_blocks: Vec<QBlock> = Vec::new();
        let mut worlds_blocks = vec![usize::MAX; vertices];
        let mut by_label: BTreeMap<usize, usize> = BTreeMap::new();
        let mut by_label_sinks: BTreeMap<usize, usize> = BTreeMap::new();
        let mut by_tag: BTreeMap<Agent, usize> = BTreeMap::new();
        for w in 0..vertices {
            let table = match w < s.worlds() {
                true if graph[w].is_empty() => &mut by_label_sinks,
                true => &mut by_label,
                false => &mut by_tag,
            };
            let key = match w < s.worlds() {
                true => s.label_id(w),
                false => tags[w - s.worlds()],
            };
            let b = *table.entry(key).or_insert_with(|| {
                q_blocks.push(QBlock {
                    elements: SparseSet::with_universe(vertices),
                    owner: 0,
                });
                q_blocks.len() - 1
            });
            q_blocks[b].elements.insert(w);
        }
        let live: Vec<usize> = by_label.into_values().chain(by_tag.into_values()).collect();
        let sinks: Vec<usize> = by_label_sinks.into_values().collect();
        for &b in &live {
            for w in q_blocks[b].elements.iter() {
                worlds_blocks[w] = b;
            }
        }

        // one compound block over everything
        let mut counts = vec![0; vertices];
        for (w, successors) in graph.iter().enumerate() {
            counts[w] = successors.len() as u64;
        }
        let subs: Vec<usize> = live.iter().chain(sinks.iter()).copied().collect();
        for &b in &subs {
            q_blocks[b].owner = 0;
        }
        let x_blocks = vec![XBlock { subs, counts }];
        let mut compound = BTreeSet::new();
        if x_blocks[0].subs.len() > 1 {
            compound.insert(0);
        }

        Self {
            q_blocks,
            x_blocks,
            live,
            sinks,
            compound,
            worlds_blocks,
            graph,
            preimage,
        }
    }

    /// one Paige-Tarjan round for a compound block
    fn step(&mut self, splitter: usize) {
        let b = self.detach_smaller(splitter);
        let b_elements: Vec<World> = self.q_blocks[b].elements.iter().collect();

        // counts into b become the counts of its new owner
        let mut b_counts = vec![0u64; self.graph.len()];
        for &y in &b_elements {
            for x in self.preimage[y].iter() {
                b_counts[x] += 1;
            }
        }

        // predecessors of b, and those whose every successor in the old
        // compound union lands inside b
        let mut b_preimage = SparseSet::with_universe(self.graph.len());
        let mut b_only_preimage = SparseSet::with_universe(self.graph.len());
        for &y in &b_elements {
            for x in self.preimage[y].iter() {
                b_preimage.insert(x);
                if b_counts[x] == self.x_blocks[splitter].counts[x] {
                    b_only_preimage.insert(x);
                }
            }
        }

        let owner = self.x_blocks.len();
        self.x_blocks.push(XBlock {
            subs: vec![b],
            counts: b_counts,
        });
        self.q_blocks[b].owner = owner;

        if !b_preimage.is_empty() {
            self.split(&b_preimage);
        }
        if !b_only_preimage.is_empty() {
            self.split(&b_only_preimage);
        }

        // remaining counts into the shrunken compound union
        for &y in &b_elements {
            for x in self.preimage[y].iter() {
                self.x_blocks[splitter].counts[x] -= 1;
            }
        }
    }

    /// remove the smaller of the splitter's first two fine blocks,
    /// requeueing the splitter while it stays compound
    fn detach_smaller(&mut self, splitter: usize) -> usize {
        let subs = &mut self.x_blocks[splitter].subs;
        let (first, second) = (subs[0], subs[1]);
        let position = match self.q_blocks[first].elements.len() <= self.q_blocks[second].elements.len() {
            true => 0,
            false => 1,
        };
        let b = subs.remove(position);
        if subs.len() > 1 {
            self.compound.insert(splitter);
        }
        b
    }

    /// carve every touched fine block into members hit by the scan and
    /// the rest, promoting owners back to compound where a split landed
    fn split(&mut self, scan: &SparseSet) {
        let mut carved: BTreeMap<usize, usize> = BTreeMap::new();
        for x in scan.iter() {
            let d = self.worlds_blocks[x];
            let d_new = match carved.get(&d) {
                Some(&d_new) => d_new,
                None => {
                    let owner = self.q_blocks[d].owner;
                    let d_new = self.q_blocks.len();
                    self.q_blocks.push(QBlock {
                        elements: SparseSet::with_universe(self.graph.len()),
                        owner,
                    });
                    self.x_blocks[owner].subs.push(d_new);
                    self.live.push(d_new);
                    carved.insert(d, d_new);
                    d_new
                }
            };
            self.q_blocks[d_new].elements.insert(x);
            self.q_blocks[d].elements.remove(x);
            self.worlds_blocks[x] = d_new;
        }
        for (&d, _) in &carved {
            let owner = self.q_blocks[d].owner;
            if self.q_blocks[d].elements.is_empty() {
                self.live.retain(|&b| b != d);
                self.x_blocks[owner].subs.retain(|&b| b != d);
                if self.x_blocks[owner].subs.is_empty() {
                    self.compound.remove(&owner);
                }
            } else if self.x_blocks[owner].subs.len() > 1 {
                self.compound.insert(owner);
            }
        }
    }

    /// read the quotient off the blocks of original worlds, numbering
    /// them by their least member for a deterministic result
    fn quotient(&self, s: &State) -> State {
        let mut world_blocks: Vec<&SparseSet> = self
            .live
            .iter()
            .chain(self.sinks.iter())
            .map(|&b| &self.q_blocks[b].elements)
            .filter(|elements| elements.first().map_or(false, |w| w < s.worlds()))
            .collect();
        world_blocks.sort_by_key(|elements| elements.first().expect("live blocks are non-empty"));

        let worlds = world_blocks.len();
        let mut renumber = vec![0; s.worlds()];
        let mut labels: Vec<Label> = Vec::with_capacity(worlds);
        for (count, elements) in world_blocks.iter().enumerate() {
            for w in elements.iter() {
                renumber[w] = count;
            }
            let representative = elements.first().expect("non-empty");
            labels.push(s.label(representative).clone());
        }

        let agents = s.language().agents();
        let mut r = relations(agents, worlds);
        for ag in 0..agents {
            for w in 0..s.worlds() {
                for v in s.accessible(ag, w).iter() {
                    r[ag][renumber[w]].insert(renumber[v]);
                }
            }
        }

        let mut designated = SparseSet::with_universe(worlds);
        for wd in s.designated().iter() {
            designated.insert(renumber[wd]);
        }
        State::new(s.language().clone(), worlds, r, labels, designated)
    }
}

/// split each agent edge through a tagged intermediate vertex
fn agent_split(s: &State) -> (Vec<SparseSet>, Vec<Agent>) {
    let mut vertices = s.worlds();
    for ag in 0..s.language().agents() {
        for w in 0..s.worlds() {
            vertices += s.accessible(ag, w).len();
        }
    }
    let mut graph: Vec<SparseSet> = (0..vertices)
        .map(|_| SparseSet::with_universe(vertices))
        .collect();
    let mut tags = vec![0; vertices - s.worlds()];
    let mut next = s.worlds();
    for ag in 0..s.language().agents() {
        for w in 0..s.worlds() {
            for v in s.accessible(ag, w).iter() {
                let w_ag = next;
                next += 1;
                tags[w_ag - s.worlds()] = ag;
                graph[w].insert(w_ag);
                graph[w_ag].insert(v);
            }
        }
    }
    (graph, tags)
}
