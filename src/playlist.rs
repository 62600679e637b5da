//! Playlist building
//!
//! Rotate-to-front ordering of the sibling videos around the activated one, and the
//! line-oriented playlist document handed to external players.

use crate::error::ExplorerError;
use crate::store::Node;

/// First line of every playlist document
pub const PLAYLIST_HEADER: &str = "#EXTM3U";

/// Videos among `siblings`, reordered so `target_id` comes first and the rest wrap around.
pub fn rotate_to_front<'a>(siblings: &'a [Node], target_id: &str) -> Result<Vec<&'a Node>, ExplorerError> {
    let mut videos: Vec<&Node> = siblings.iter().filter(|node| node.is_video()).collect();
    let k = videos
        .iter()
        .position(|node| node.id == target_id)
        .ok_or_else(|| ExplorerError::TargetNotFound(target_id.to_string()))?;
    videos.rotate_left(k);
    Ok(videos)
}

/// One playable item
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlaylistEntry {
    pub node_id: String,
    pub title: String,
    pub url: String,
}

/// Playlist in effective playback order
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Playlist {
    entries: Vec<PlaylistEntry>,
}

impl Playlist {
    /// Build the playlist for activating `target_id` among `siblings`.
    ///
    /// Videos without a source URL are skipped. Fails with `TargetNotFound` when the target is
    /// not one of the sibling videos, and `NoPlayableMedia` when nothing is streamable.
    pub fn from_siblings(siblings: &[Node], target_id: &str) -> Result<Self, ExplorerError> {
        let entries: Vec<PlaylistEntry> = rotate_to_front(siblings, target_id)?
            .into_iter()
            .filter_map(|node| {
                node.stream_url().map(|url| PlaylistEntry {
                    node_id: node.id.clone(),
                    title: node.name.clone(),
                    url: url.to_string(),
                })
            })
            .collect();
        if entries.is_empty() {
            return Err(ExplorerError::NoPlayableMedia);
        }
        Ok(Self { entries })
    }

    pub fn entries(&self) -> &[PlaylistEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Serialize: header line, then a metadata line and a URL line per entry.
    pub fn render(&self) -> String {
        let mut doc = String::with_capacity(16 + self.entries.len() * 96);
        doc.push_str(PLAYLIST_HEADER);
        doc.push('\n');
        for entry in &self.entries {
            // line-oriented format: a stray newline in a title would split the pair
            let title = entry.title.replace(['\r', '\n'], " ");
            doc.push_str(&format!("#EXTINF:-1, {}\n{}\n", title, entry.url.trim()));
        }
        doc
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::NodeKind;
    use proptest::prelude::*;

    fn video(id: &str) -> Node {
        Node::video(id, format!("{}.mp4", id), "m", format!("http://x/{}", id))
    }

    fn ids(nodes: &[&Node]) -> Vec<String> {
        nodes.iter().map(|n| n.id.clone()).collect()
    }

    #[test]
    fn rotates_selected_video_to_front() {
        let siblings = vec![video("A"), video("B"), video("C"), video("D")];
        let order = rotate_to_front(&siblings, "C").unwrap();
        assert_eq!(ids(&order), vec!["C", "D", "A", "B"]);
    }

    #[test]
    fn non_videos_are_ignored_by_rotation() {
        let siblings = vec![
            Node::container("f", "Extras", "m"),
            video("A"),
            Node::leaf("i", "cover.jpg", NodeKind::Image, "m"),
            video("B"),
        ];
        assert_eq!(ids(&rotate_to_front(&siblings, "B").unwrap()), vec!["B", "A"]);
    }

    #[test]
    fn missing_target_is_reported() {
        let siblings = vec![video("A"), video("B")];
        assert_eq!(
            rotate_to_front(&siblings, "Z").unwrap_err(),
            ExplorerError::TargetNotFound("Z".to_string())
        );
        let folder = vec![Node::container("A", "A", "m")];
        assert!(rotate_to_front(&folder, "A").is_err());
    }

    #[test]
    fn videos_without_url_are_skipped() {
        let siblings = vec![
            Node::video("a", "A.mp4", "m", "http://x/a"),
            Node::video("b", "B.mp4", "m", ""),
        ];
        let playlist = Playlist::from_siblings(&siblings, "a").unwrap();
        assert_eq!(playlist.render(), "#EXTM3U\n#EXTINF:-1, A.mp4\nhttp://x/a\n");
    }

    #[test]
    fn nothing_streamable_is_no_playable_media() {
        let siblings = vec![Node::video("b", "B.mp4", "m", "")];
        assert_eq!(
            Playlist::from_siblings(&siblings, "b").unwrap_err(),
            ExplorerError::NoPlayableMedia
        );
    }

    #[test]
    fn titles_cannot_break_lines() {
        let siblings = vec![Node::video("a", "Bad\nName.mp4", "m", "http://x/a")];
        let doc = Playlist::from_siblings(&siblings, "a").unwrap().render();
        assert_eq!(doc.lines().count(), 3);
    }

    proptest! {
        #[test]
        fn rotation_is_a_cyclic_shift(len in 1usize..20, pick in 0usize..20) {
            let siblings: Vec<Node> = (0..len).map(|i| video(&format!("v{}", i))).collect();
            let k = pick % len;
            let order = rotate_to_front(&siblings, &siblings[k].id).unwrap();
            prop_assert_eq!(order.len(), len);
            for (offset, node) in order.iter().enumerate() {
                prop_assert_eq!(&node.id, &siblings[(k + offset) % len].id);
            }
        }
    }
}
