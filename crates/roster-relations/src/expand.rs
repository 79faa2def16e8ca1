//! Expansion of a union snapshot into one character's relationship rows.
//!
//! Rows come out in a fixed order: for each union in input order, partner
//! rows, then `Parents` rows, then the faction `Member` row; after all
//! unions, `Sibling` rows and then `Peer` rows in ascending character id.
//! Siblings and peers are collected into ordered sets so a character who
//! shares several unions with the focal one yields a single row.

use std::collections::BTreeSet;

use roster_core::{
    encode, encode_participant, CharacterId, RelationshipRow, RelationshipType, Union, UnionKind,
    UnionOption,
};

use crate::types::Expansion;

/// Flatten `unions` into the relationship list of `focal`.
///
/// Invalid unions (no parent-side participant) are skipped with a warning.
pub fn expand(unions: &[Union], focal: CharacterId) -> Expansion {
    let mut expansion = Expansion::default();
    let mut siblings: BTreeSet<CharacterId> = BTreeSet::new();
    let mut peers: BTreeSet<CharacterId> = BTreeSet::new();

    for union in unions {
        if let Err(e) = union.validate() {
            tracing::warn!(union_id = %union.id, error = %e, "Skipping invalid union");
            continue;
        }
        match union.kind {
            UnionKind::Liaison => expand_liaison(union, focal, &mut expansion, &mut siblings),
            UnionKind::Faction => expand_faction(union, focal, &mut expansion, &mut peers),
        }
    }

    expansion.relations.extend(
        siblings
            .into_iter()
            .map(|id| RelationshipRow::derived(RelationshipType::Sibling, id)),
    );
    expansion.relations.extend(
        peers
            .into_iter()
            .map(|id| RelationshipRow::derived(RelationshipType::Peer, id)),
    );

    tracing::debug!(
        focal = %focal,
        unions = expansion.unions.len(),
        relations = expansion.relations.len(),
        "Expanded relationships"
    );
    expansion
}

/// Display label of a liaison: its partners' names joined with " & ".
pub fn liaison_label(union: &Union) -> String {
    union
        .parent_side()
        .map(|p| p.name.as_str())
        .collect::<Vec<_>>()
        .join(" & ")
}

fn expand_liaison(
    union: &Union,
    focal: CharacterId,
    expansion: &mut Expansion,
    siblings: &mut BTreeSet<CharacterId>,
) {
    expansion.unions.push(UnionOption {
        value: union.id,
        label: liaison_label(union),
    });

    if union.has_parent(focal) {
        let partnership = encode(union);
        for partner in union.parent_side().filter(|p| p.id != focal) {
            expansion
                .relations
                .push(RelationshipRow::new(partnership, union.id, partner.id));
        }
        for child in union.child_side() {
            expansion.relations.push(RelationshipRow::new(
                encode_participant(union, child, focal),
                union.id,
                child.id,
            ));
        }
    }

    if union.has_child(focal) {
        siblings.extend(union.child_side().map(|c| c.id).filter(|id| *id != focal));
    }
}

fn expand_faction(
    union: &Union,
    focal: CharacterId,
    expansion: &mut Expansion,
    peers: &mut BTreeSet<CharacterId>,
) {
    let Some(member) = union.participants.iter().find(|p| p.id == focal) else {
        return;
    };

    expansion.relations.push(RelationshipRow::new(
        encode_participant(union, member, focal),
        union.id,
        focal,
    ));
    peers.extend(
        union
            .participants
            .iter()
            .map(|p| p.id)
            .filter(|id| *id != focal),
    );
}

#[cfg(test)]
mod tests {
    use super::*;
    use roster_core::{Participant, Role, Sex, UnionId};

    fn participant(id: i64, role: Role, name: &str) -> Participant {
        Participant {
            id: CharacterId(id),
            role,
            name: name.to_string(),
            sex: Sex::Female,
        }
    }

    fn union(id: i64, kind: UnionKind, legitimate: bool, participants: Vec<Participant>) -> Union {
        Union {
            id: UnionId(id),
            kind,
            legitimate,
            is_primary: legitimate,
            participants,
        }
    }

    /// Alice and Bob, married, with children Carol and Dan.
    fn union_five() -> Union {
        union(
            5,
            UnionKind::Liaison,
            true,
            vec![
                participant(1, Role::Parent, "Alice"),
                participant(2, Role::Parent, "Bob"),
                participant(3, Role::Child, "Carol"),
                participant(4, Role::Child, "Dan"),
            ],
        )
    }

    #[test]
    fn parent_sees_partner_and_children() {
        let expansion = expand(&[union_five()], CharacterId(1));

        assert_eq!(
            expansion.relations,
            vec![
                RelationshipRow::new(RelationshipType::Spouse, UnionId(5), CharacterId(2)),
                RelationshipRow::new(RelationshipType::Parents, UnionId(5), CharacterId(3)),
                RelationshipRow::new(RelationshipType::Parents, UnionId(5), CharacterId(4)),
            ]
        );
        assert_eq!(
            expansion.unions,
            vec![UnionOption {
                value: UnionId(5),
                label: "Alice & Bob".to_string(),
            }]
        );
    }

    #[test]
    fn child_sees_only_siblings() {
        let expansion = expand(&[union_five()], CharacterId(3));
        assert_eq!(
            expansion.relations,
            vec![RelationshipRow::derived(
                RelationshipType::Sibling,
                CharacterId(4)
            )]
        );
        // The parents' liaison is still offered as a source.
        assert_eq!(expansion.unions.len(), 1);
    }

    #[test]
    fn expansion_is_idempotent() {
        let unions = vec![
            union_five(),
            union(
                8,
                UnionKind::Faction,
                false,
                vec![
                    participant(1, Role::Member, "Alice"),
                    participant(6, Role::Member, "Fay"),
                ],
            ),
        ];
        let first = expand(&unions, CharacterId(1));
        let second = expand(&unions, CharacterId(1));
        assert_eq!(
            serde_json::to_string(&first).unwrap(),
            serde_json::to_string(&second).unwrap()
        );
    }

    #[test]
    fn siblings_are_deduplicated_across_unions() {
        let unions = vec![
            union_five(),
            union(
                6,
                UnionKind::Liaison,
                false,
                vec![
                    participant(1, Role::Parent, "Alice"),
                    participant(7, Role::Parent, "Gus"),
                    participant(4, Role::Child, "Dan"),
                    participant(3, Role::Child, "Carol"),
                    participant(9, Role::Child, "Ivy"),
                ],
            ),
        ];

        let expansion = expand(&unions, CharacterId(3));
        assert_eq!(
            expansion.relations,
            vec![
                RelationshipRow::derived(RelationshipType::Sibling, CharacterId(4)),
                RelationshipRow::derived(RelationshipType::Sibling, CharacterId(9)),
            ]
        );
    }

    #[test]
    fn faction_yields_member_then_sorted_peers() {
        let unions = vec![
            union(
                8,
                UnionKind::Faction,
                false,
                vec![
                    participant(12, Role::Member, "Lia"),
                    participant(1, Role::Member, "Alice"),
                    participant(10, Role::Member, "Jon"),
                ],
            ),
            union(
                9,
                UnionKind::Faction,
                false,
                vec![
                    participant(10, Role::Member, "Jon"),
                    participant(11, Role::Member, "Kit"),
                ],
            ),
        ];

        let expansion = expand(&unions, CharacterId(1));
        assert_eq!(
            expansion.relations,
            vec![
                RelationshipRow::new(RelationshipType::Member, UnionId(8), CharacterId(1)),
                RelationshipRow::derived(RelationshipType::Peer, CharacterId(10)),
                RelationshipRow::derived(RelationshipType::Peer, CharacterId(12)),
            ]
        );
        // Factions are never offered as liaison sources.
        assert!(expansion.unions.is_empty());
    }

    #[test]
    fn derived_rows_come_last() {
        let unions = vec![
            union(
                8,
                UnionKind::Faction,
                false,
                vec![
                    participant(3, Role::Member, "Carol"),
                    participant(6, Role::Member, "Fay"),
                ],
            ),
            union_five(),
            union(
                6,
                UnionKind::Liaison,
                false,
                vec![
                    participant(3, Role::Parent, "Carol"),
                    participant(7, Role::Parent, "Gus"),
                ],
            ),
        ];

        let kinds: Vec<RelationshipType> = expand(&unions, CharacterId(3))
            .relations
            .iter()
            .filter_map(|r| r.kind)
            .collect();
        assert_eq!(
            kinds,
            vec![
                RelationshipType::Member,
                RelationshipType::Lover,
                RelationshipType::Sibling,
                RelationshipType::Peer,
            ]
        );
    }

    #[test]
    fn invalid_liaison_is_skipped() {
        let orphaned = union(
            7,
            UnionKind::Liaison,
            true,
            vec![participant(3, Role::Child, "Carol"), participant(4, Role::Child, "Dan")],
        );

        let expansion = expand(&[orphaned], CharacterId(3));
        assert!(expansion.relations.is_empty());
        assert!(expansion.unions.is_empty());
    }
}
